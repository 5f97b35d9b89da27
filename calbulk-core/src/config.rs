//! Global calbulk configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::dispatch::DEFAULT_CONCURRENCY;
use crate::error::{CalbulkError, CalbulkResult};

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Global configuration at ~/.config/calbulk/config.toml
///
/// Every key can be overridden from the environment with a `CALBULK_`
/// prefix, e.g. `CALBULK_TIMEZONE=Europe/Madrid`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CalbulkConfig {
    /// Accounts allowed to use calbulk. Empty means nobody.
    #[serde(default)]
    pub allowed_emails: Vec<String>,

    /// IANA zone used to read and write wall-clock times.
    /// Defaults to the system zone.
    pub timezone: Option<String>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    pub default_calendar: Option<String>,
}

impl Default for CalbulkConfig {
    fn default() -> Self {
        CalbulkConfig {
            allowed_emails: Vec::new(),
            timezone: None,
            concurrency: DEFAULT_CONCURRENCY,
            default_calendar: None,
        }
    }
}

impl CalbulkConfig {
    pub fn config_dir() -> CalbulkResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| CalbulkError::Config("Could not determine config directory".into()))?
            .join("calbulk"))
    }

    pub fn config_path() -> CalbulkResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load ~/.config/calbulk/config.toml, creating a commented default first
    /// if it does not exist.
    pub fn load() -> CalbulkResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::build(File::from(config_path).required(false))
    }

    pub fn from_toml_str(contents: &str) -> CalbulkResult<Self> {
        Self::build(File::from_str(contents, FileFormat::Toml))
    }

    fn build<S>(file: S) -> CalbulkResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("CALBULK")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_emails"),
            )
            .build()
            .map_err(|e| CalbulkError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalbulkError::Config(e.to_string()))
    }

    /// Create a default config file with the optional keys commented out.
    pub fn create_default_config(path: &Path) -> CalbulkResult<()> {
        let contents = format!(
            "\
# calbulk configuration

# Google accounts allowed to use calbulk:
allowed_emails = []

# Time zone for dates and times you type and see (defaults to the system zone):
# timezone = \"Europe/Madrid\"

# Requests sent at once during a batch:
# concurrency = {DEFAULT_CONCURRENCY}

# Calendar used when --calendar is not given:
# default_calendar = \"primary\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// The operator's time zone: the configured one, else the system zone, else UTC.
    pub fn timezone(&self) -> CalbulkResult<Tz> {
        if let Some(name) = &self.timezone {
            return name
                .parse()
                .map_err(|_| CalbulkError::Config(format!("Unknown time zone '{name}'")));
        }

        Ok(iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse().ok())
            .unwrap_or(Tz::UTC))
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed_emails
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(email.trim()))
    }

    /// Fail with `AuthorizationDenied` unless `email` is on the allow-list.
    pub fn authorize(&self, email: &str) -> CalbulkResult<()> {
        if self.is_allowed(email) {
            Ok(())
        } else {
            Err(CalbulkError::AuthorizationDenied(email.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = CalbulkConfig::from_toml_str(
            r#"
allowed_emails = ["ops@example.com", "Lead@Example.com"]
timezone = "Europe/Madrid"
concurrency = 4
default_calendar = "team@group.calendar.google.com"
"#,
        )
        .unwrap();

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Madrid);
        assert_eq!(
            config.default_calendar.as_deref(),
            Some("team@group.calendar.google.com")
        );
        assert!(config.is_allowed("lead@example.com"));
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = CalbulkConfig::from_toml_str("").unwrap();

        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.allowed_emails.is_empty());
        assert!(config.default_calendar.is_none());
    }

    #[test]
    fn empty_allow_list_denies_everyone() {
        let config = CalbulkConfig::default();

        assert!(matches!(
            config.authorize("me@example.com"),
            Err(CalbulkError::AuthorizationDenied(email)) if email == "me@example.com"
        ));
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let config = CalbulkConfig {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };

        assert!(matches!(config.timezone(), Err(CalbulkError::Config(_))));
    }

    #[test]
    fn default_config_file_round_trips() {
        let dir = std::env::temp_dir().join(format!("calbulk-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        CalbulkConfig::create_default_config(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let config = CalbulkConfig::from_toml_str(&contents).unwrap();

        assert_eq!(config, CalbulkConfig::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_config_path_is_an_io_error() {
        let blocker = std::env::temp_dir().join(format!("calbulk-blocker-{}", std::process::id()));
        std::fs::write(&blocker, "").unwrap();

        let result = CalbulkConfig::create_default_config(&blocker.join("config.toml"));

        assert!(matches!(result, Err(CalbulkError::Io(_))));
        std::fs::remove_file(&blocker).unwrap();
    }
}
