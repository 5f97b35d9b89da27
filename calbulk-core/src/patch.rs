//! Partial-update payloads built from an edit draft.

use chrono_tz::Tz;

use crate::draft::EditDraft;
use crate::error::TemporalError;
use crate::event::{Event, EventTime};
use crate::temporal::{align_shapes, resolve_merge};

/// Fields to overwrite on one event. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
}

impl EventPatch {
    /// Merge `draft` onto `event`.
    ///
    /// Start and end are resolved independently. End fields on an open-ended
    /// event take their missing half from the event's start; without end
    /// fields an open-ended event stays open-ended.
    pub fn build(event: &Event, draft: &EditDraft, tz: &Tz) -> Result<Self, TemporalError> {
        let start = resolve_merge(
            &event.start,
            draft.start_date.as_deref(),
            draft.start_time.as_deref(),
            draft.all_day,
            tz,
        )?;

        let end_base = event.end.as_ref().unwrap_or(&event.start);
        let end = resolve_merge(
            end_base,
            draft.end_date.as_deref(),
            draft.end_time.as_deref(),
            draft.all_day,
            tz,
        )?;

        let (start, end) = align_shapes(&event.start, event.end.as_ref(), start, end, tz);

        Ok(EventPatch {
            summary: draft.title.clone(),
            description: draft.description.clone(),
            start,
            end,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// What the event would look like if the service accepted the patch as-is.
    pub fn apply_to(&self, event: &Event) -> Event {
        Event {
            id: event.id.clone(),
            summary: self.summary.clone().unwrap_or_else(|| event.summary.clone()),
            description: self.description.clone().or_else(|| event.description.clone()),
            start: self.start.unwrap_or(event.start),
            end: self.end.or(event.end),
        }
    }
}
