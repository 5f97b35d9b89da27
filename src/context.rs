//! What every event command needs before it can touch a calendar.

use anyhow::Result;
use calbulk_core::config::CalbulkConfig;
use calbulk_core::error::{CalbulkError, CalbulkResult};
use calbulk_core::service::load_calendars;
use calbulk_core::Calendar;
use calbulk_provider_google::{GoogleCalendarService, Session};
use chrono_tz::Tz;

pub struct Context {
    pub config: CalbulkConfig,
    pub tz: Tz,
    pub service: GoogleCalendarService,
}

impl Context {
    /// Load the config and the Google session, and refuse accounts that are
    /// not on the allow-list.
    pub async fn load() -> Result<Self> {
        let config = CalbulkConfig::load()?;
        let tz = config.timezone()?;
        let session = Session::load_valid().await?;

        config.authorize(session.email())?;

        let service = GoogleCalendarService::new(session.access_token());

        Ok(Context {
            config,
            tz,
            service,
        })
    }

    /// The calendar to work on: `requested`, else the configured default,
    /// else the first calendar of the account.
    pub async fn calendar(&self, requested: Option<&str>) -> Result<Calendar> {
        let calendars = load_calendars(&self.service).await;
        let requested = requested.or(self.config.default_calendar.as_deref());

        Ok(resolve_calendar(calendars, requested)?)
    }
}

/// Match `requested` against ids, then names (case-insensitive). `primary`
/// also names the account's primary calendar.
pub fn resolve_calendar(mut calendars: Vec<Calendar>, requested: Option<&str>) -> CalbulkResult<Calendar> {
    let Some(requested) = requested else {
        return calendars
            .into_iter()
            .next()
            .ok_or_else(|| CalbulkError::CalendarNotFound("no calendars available".to_string()));
    };

    let position = calendars
        .iter()
        .position(|c| c.id == requested || (requested == "primary" && c.primary))
        .or_else(|| {
            calendars
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(requested))
        });

    match position {
        Some(i) => Ok(calendars.swap_remove(i)),
        None => {
            let available: Vec<_> = calendars.iter().map(|c| c.name.clone()).collect();
            Err(CalbulkError::CalendarNotFound(format!(
                "'{}'. Available: {}",
                requested,
                available.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendars() -> Vec<Calendar> {
        vec![
            Calendar {
                id: "team@group.calendar.google.com".to_string(),
                name: "Team".to_string(),
                primary: false,
            },
            Calendar {
                id: "me@example.com".to_string(),
                name: "Me".to_string(),
                primary: true,
            },
        ]
    }

    #[test]
    fn defaults_to_first_calendar() {
        let calendar = resolve_calendar(calendars(), None).unwrap();

        assert_eq!(calendar.name, "Team");
    }

    #[test]
    fn matches_id_name_and_primary_alias() {
        assert_eq!(resolve_calendar(calendars(), Some("me@example.com")).unwrap().name, "Me");
        assert_eq!(resolve_calendar(calendars(), Some("team")).unwrap().name, "Team");
        assert_eq!(resolve_calendar(calendars(), Some("primary")).unwrap().name, "Me");
    }

    #[test]
    fn unknown_calendar_lists_available_ones() {
        let err = resolve_calendar(calendars(), Some("Holidays")).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Calendar not found: 'Holidays'. Available: Team, Me"
        );
    }

    #[test]
    fn no_calendars_is_an_error() {
        assert!(matches!(
            resolve_calendar(Vec::new(), None),
            Err(CalbulkError::CalendarNotFound(_))
        ));
    }
}
