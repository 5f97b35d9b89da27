//! The calendar service seam.
//!
//! The dispatcher and the loaders only know this trait; the Google provider
//! implements it over HTTP and tests implement it in memory.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::ServiceError;
use crate::event::{Calendar, Event};
use crate::patch::EventPatch;

#[allow(async_fn_in_trait)]
pub trait CalendarService {
    /// Calendars visible to the authenticated account.
    async fn list_calendars(&self) -> Result<Vec<Calendar>, ServiceError>;

    /// Non-cancelled events on `calendar_id` starting at or after `time_min`,
    /// as single instances ordered by start time.
    async fn list_upcoming_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
    ) -> Result<Vec<Event>, ServiceError>;

    /// Overwrite the fields present in `patch` and return the updated event.
    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<Event, ServiceError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ServiceError>;
}

/// Load calendars, degrading to an empty list when the service fails.
pub async fn load_calendars<S: CalendarService>(service: &S) -> Vec<Calendar> {
    match service.list_calendars().await {
        Ok(calendars) => calendars,
        Err(e) => {
            warn!(error = %e, "could not list calendars");
            Vec::new()
        }
    }
}

/// Load upcoming events, degrading to an empty list when the service fails.
pub async fn load_upcoming_events<S: CalendarService>(
    service: &S,
    calendar_id: &str,
    now: DateTime<Utc>,
) -> Vec<Event> {
    match service.list_upcoming_events(calendar_id, now).await {
        Ok(events) => events,
        Err(e) => {
            warn!(calendar = calendar_id, error = %e, "could not list events");
            Vec::new()
        }
    }
}
