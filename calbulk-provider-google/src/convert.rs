//! Conversions between the Calendar v3 JSON shapes and calbulk's types.

use anyhow::{Result, anyhow};
use calbulk_core::patch::EventPatch;
use calbulk_core::{Calendar, Event, EventTime};
use chrono::{SecondsFormat, Utc};

use crate::wire::{CalendarListEntry, GoogleEvent, GoogleEventTime, PatchBody, PatchTime};

/// Convert from Google API types to calbulk types
pub trait FromGoogle<T> {
    fn from_google(value: T) -> Result<Self>
    where
        Self: Sized;
}

/// Convert to Google API types from calbulk types
pub trait ToGoogle<T> {
    fn to_google(&self) -> T;
}

impl FromGoogle<CalendarListEntry> for Calendar {
    fn from_google(entry: CalendarListEntry) -> Result<Self> {
        Ok(Calendar {
            name: if entry.summary.is_empty() {
                "(unnamed)".to_string()
            } else {
                entry.summary
            },
            id: entry.id,
            primary: entry.primary,
        })
    }
}

impl FromGoogle<&GoogleEventTime> for EventTime {
    fn from_google(time: &GoogleEventTime) -> Result<Self> {
        match (time.date_time, time.date) {
            (Some(dt), _) => Ok(EventTime::DateTime(dt.with_timezone(&Utc))),
            (None, Some(date)) => Ok(EventTime::Date(date)),
            (None, None) => Err(anyhow!("event time has neither date nor dateTime")),
        }
    }
}

impl FromGoogle<GoogleEvent> for Event {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let start = event
            .start
            .as_ref()
            .ok_or_else(|| anyhow!("event {} has no start", event.id))?;

        Ok(Event {
            start: EventTime::from_google(start)?,
            end: event.end.as_ref().map(EventTime::from_google).transpose()?,
            summary: event.summary.unwrap_or_default(),
            description: event.description.filter(|d| !d.is_empty()),
            id: event.id,
        })
    }
}

impl ToGoogle<PatchTime> for EventTime {
    fn to_google(&self) -> PatchTime {
        match self {
            EventTime::Date(date) => PatchTime {
                date: Some(*date),
                date_time: None,
            },
            EventTime::DateTime(dt) => PatchTime {
                date: None,
                date_time: Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            },
        }
    }
}

impl ToGoogle<PatchBody> for EventPatch {
    fn to_google(&self) -> PatchBody {
        PatchBody {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: self.start.as_ref().map(|t| t.to_google()),
            end: self.end.as_ref().map(|t| t.to_google()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn event_json(value: serde_json::Value) -> Result<Event> {
        Event::from_google(serde_json::from_value::<GoogleEvent>(value).unwrap())
    }

    #[test]
    fn timed_event_is_read_in_utc() {
        let event = event_json(json!({
            "id": "a",
            "summary": "Standup",
            "start": {"dateTime": "2024-06-03T09:00:00+02:00", "timeZone": "Europe/Madrid"},
            "end": {"dateTime": "2024-06-03T09:30:00+02:00"}
        }))
        .unwrap();

        assert_eq!(
            event.start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap())
        );
        assert_eq!(event.description, None);
    }

    #[test]
    fn all_day_event_without_end() {
        let event = event_json(json!({
            "id": "b",
            "summary": "Demo",
            "description": "",
            "start": {"date": "2024-06-01"}
        }))
        .unwrap();

        assert_eq!(
            event.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );
        assert_eq!(event.end, None);
        assert_eq!(event.description, None);
    }

    #[test]
    fn date_time_wins_when_both_are_present() {
        let event = event_json(json!({
            "id": "c",
            "start": {"date": "2024-06-01", "dateTime": "2024-06-01T10:00:00Z"}
        }))
        .unwrap();

        assert!(!event.start.is_all_day());
        assert_eq!(event.summary, "");
    }

    #[test]
    fn start_without_shape_is_rejected() {
        assert!(event_json(json!({"id": "d", "start": {}})).is_err());
        assert!(event_json(json!({"id": "e"})).is_err());
    }

    #[test]
    fn patch_body_nulls_the_unused_shape() {
        let patch = EventPatch {
            summary: Some("Sync".to_string()),
            description: None,
            start: Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())),
            end: Some(EventTime::DateTime(
                Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap(),
            )),
        };

        let body = serde_json::to_value(patch.to_google()).unwrap();

        assert_eq!(
            body,
            json!({
                "summary": "Sync",
                "start": {"date": "2024-06-10", "dateTime": null},
                "end": {"date": null, "dateTime": "2024-06-10T17:00:00Z"}
            })
        );
    }

    #[test]
    fn empty_patch_is_an_empty_object() {
        let body = serde_json::to_value(EventPatch::default().to_google()).unwrap();

        assert_eq!(body, json!({}));
    }
}
