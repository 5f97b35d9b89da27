//! Event types.
//!
//! These mirror the subset of a calendar service event that bulk editing
//! touches. The provider converts its API responses into these types, and the
//! rest of calbulk works exclusively with them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::temporal::start_of_local_day;

/// A calendar event as last fetched from (or confirmed by) the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start: EventTime,
    /// Open-ended events have no end.
    pub end: Option<EventTime>,
}

/// Either an all-day date or a timed instant, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Absolute instant, reading an all-day date as local midnight in `tz`.
    pub fn to_utc(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            EventTime::Date(date) => start_of_local_day(*date, tz),
            EventTime::DateTime(dt) => *dt,
        }
    }

    /// Calendar date as seen in `tz`.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::Date(date) => *date,
            EventTime::DateTime(dt) => dt.with_timezone(tz).date_naive(),
        }
    }

    /// Time of day as seen in `tz` (`00:00` for all-day dates).
    pub fn local_time(&self, tz: &Tz) -> NaiveTime {
        match self {
            EventTime::Date(_) => NaiveTime::MIN,
            EventTime::DateTime(dt) => dt.with_timezone(tz).time(),
        }
    }
}

impl Event {
    /// Instant used as the event's lower edge when filtering.
    pub fn start_instant(&self, tz: &Tz) -> DateTime<Utc> {
        self.start.to_utc(tz)
    }

    /// Instant used as the event's upper edge when filtering.
    /// Open-ended events are bounded by their own start.
    pub fn end_instant(&self, tz: &Tz) -> DateTime<Utc> {
        self.end.as_ref().unwrap_or(&self.start).to_utc(tz)
    }
}

/// A calendar available to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;

    #[test]
    fn all_day_date_reads_as_local_midnight() {
        let time = EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        // Madrid is UTC+2 in June
        assert_eq!(
            time.to_utc(&Madrid),
            Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap()
        );
        assert_eq!(time.local_time(&Madrid), NaiveTime::MIN);
    }

    #[test]
    fn timed_instant_reports_local_date_and_time() {
        let time = EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap());

        assert_eq!(
            time.local_date(&Madrid),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
        assert_eq!(
            time.local_time(&Madrid),
            NaiveTime::from_hms_opt(1, 30, 0).unwrap()
        );
    }

    #[test]
    fn open_ended_event_is_bounded_by_its_start() {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let event = Event {
            id: "a".to_string(),
            summary: "Standup".to_string(),
            description: None,
            start: EventTime::DateTime(start),
            end: None,
        };

        assert_eq!(event.end_instant(&chrono_tz::UTC), start);
    }
}
