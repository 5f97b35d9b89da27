//! The signed-in Google account and its access token.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_config::{self, base_dir};

/// Tokens are refreshed this long before Google would reject them.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    pub email: String,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn from_tokens(email: &str, tokens: &AccessToken) -> Self {
        SessionData {
            email: email.to_string(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }

    /// Apply a token refresh. Google usually omits the refresh token, in which
    /// case the stored one is kept.
    fn refreshed(self, access_token: String, refresh_token: String, expires_in: i64) -> Self {
        SessionData {
            access_token,
            refresh_token: if refresh_token.is_empty() {
                self.refresh_token
            } else {
                refresh_token
            },
            expires_at: Utc::now() + Duration::seconds(expires_in),
            ..self
        }
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    pub fn default_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    pub fn new(data: SessionData) -> Result<Self> {
        Ok(Session {
            path: Self::default_path()?,
            data,
        })
    }

    pub fn email(&self) -> &str {
        &self.data.email
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    /// Load the stored session and refresh it if expired.
    pub async fn load_valid() -> Result<Self> {
        let mut session = Self::load_from(&Self::default_path()?)?;

        if session.data.is_expired_at(Utc::now()) {
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Not signed in to Google. Run `calbulk auth` first.");
        }

        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })?;

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        debug!(email = %self.data.email, "refreshing Google access token");
        let creds = app_config::load()?;

        let client = Client::new(
            creds.client_id,
            creds.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        );

        let tokens = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        self.data = self
            .data
            .clone()
            .refreshed(tokens.access_token, tokens.refresh_token, tokens.expires_in);
        self.save()
    }
}
