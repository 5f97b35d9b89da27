//! Fan-out of batch edits and deletes to the calendar service.
//!
//! Every selected event gets its own request. Requests run concurrently up to
//! the configured limit, each one yields its own outcome, and a single join
//! collects them in selection order. One failure never stops its siblings.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::draft::EditDraft;
use crate::error::{MutationError, ServiceError};
use crate::event::Event;
use crate::patch::EventPatch;
use crate::service::CalendarService;

/// Requests in flight per batch unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service accepted the patch and returned the stored event.
    Updated(Event),
    Deleted,
    Failed(MutationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub event_id: String,
    pub outcome: Outcome,
}

impl EventOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Success,
    PartialFailure,
    TotalFailure,
    /// Nothing was selected.
    Empty,
}

/// Which mutation a batch ran, and so what `BatchReport::events` holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchKind {
    /// `events` holds only the batch's events, as stored after the edit.
    #[default]
    Edit,
    /// `events` is the refetched upcoming collection.
    Delete,
}

/// Result of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub kind: BatchKind,
    /// One entry per selected event, in selection order.
    pub outcomes: Vec<EventOutcome>,
    /// The collection after the batch.
    pub events: Vec<Event>,
    /// Set when the post-delete refetch failed and `events` is empty because of it.
    pub refresh_error: Option<ServiceError>,
}

impl BatchReport {
    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| o.event_id.as_str())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &MutationError)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Failed(e) => Some((o.event_id.as_str(), e)),
            _ => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.len() - self.failed_ids().len()
    }

    pub fn status(&self) -> BatchStatus {
        let failed = self.failed_ids().len();
        match (self.outcomes.len(), failed) {
            (0, _) => BatchStatus::Empty,
            (_, 0) => BatchStatus::Success,
            (total, failed) if failed == total => BatchStatus::TotalFailure,
            _ => BatchStatus::PartialFailure,
        }
    }
}

/// Runs batches against one calendar.
pub struct Dispatcher<'a, S> {
    service: &'a S,
    calendar_id: &'a str,
    concurrency: usize,
}

impl<'a, S: CalendarService> Dispatcher<'a, S> {
    pub fn new(service: &'a S, calendar_id: &'a str) -> Self {
        Dispatcher {
            service,
            calendar_id,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// PATCH every selected event with `draft` merged onto it.
    ///
    /// An event whose draft fields do not resolve fails on its own and is not
    /// sent. Empty patches are still sent.
    pub async fn apply_edit(&self, selected: &[Event], draft: &EditDraft, tz: &Tz) -> BatchReport {
        let outcomes: Vec<EventOutcome> = stream::iter(selected)
            .map(|event| self.edit_one(event, draft, tz))
            .buffered(self.concurrency)
            .collect()
            .await;

        let events = selected
            .iter()
            .zip(&outcomes)
            .map(|(prior, result)| match &result.outcome {
                Outcome::Updated(updated) => updated.clone(),
                _ => prior.clone(),
            })
            .collect();

        BatchReport {
            kind: BatchKind::Edit,
            outcomes,
            events,
            refresh_error: None,
        }
    }

    async fn edit_one(&self, event: &Event, draft: &EditDraft, tz: &Tz) -> EventOutcome {
        let outcome = match EventPatch::build(event, draft, tz) {
            Ok(patch) => {
                debug!(event = %event.id, ?patch, "patching event");
                match self.service.patch_event(self.calendar_id, &event.id, &patch).await {
                    Ok(updated) => {
                        info!(event = %event.id, summary = %updated.summary, "updated event");
                        Outcome::Updated(updated)
                    }
                    Err(e) => {
                        warn!(event = %event.id, error = %e, "update failed");
                        Outcome::Failed(e.into())
                    }
                }
            }
            Err(e) => {
                warn!(event = %event.id, error = %e, "skipping event with malformed draft");
                Outcome::Failed(e.into())
            }
        };

        EventOutcome {
            event_id: event.id.clone(),
            outcome,
        }
    }

    /// DELETE every selected event, then refetch the upcoming events from `now`.
    ///
    /// The refetch makes the collection match the server regardless of which
    /// calls reported failure.
    pub async fn delete_selected(&self, selected: &[Event], now: DateTime<Utc>) -> BatchReport {
        let outcomes: Vec<EventOutcome> = stream::iter(selected)
            .map(|event| self.delete_one(event))
            .buffered(self.concurrency)
            .collect()
            .await;

        let (events, refresh_error) = match self
            .service
            .list_upcoming_events(self.calendar_id, now)
            .await
        {
            Ok(events) => (events, None),
            Err(e) => {
                warn!(calendar = self.calendar_id, error = %e, "refetch after delete failed");
                (Vec::new(), Some(e))
            }
        };

        BatchReport {
            kind: BatchKind::Delete,
            outcomes,
            events,
            refresh_error,
        }
    }

    async fn delete_one(&self, event: &Event) -> EventOutcome {
        debug!(event = %event.id, "deleting event");
        let outcome = match self.service.delete_event(self.calendar_id, &event.id).await {
            Ok(()) => {
                info!(event = %event.id, "deleted event");
                Outcome::Deleted
            }
            Err(e) => {
                warn!(event = %event.id, error = %e, "delete failed");
                Outcome::Failed(e.into())
            }
        };

        EventOutcome {
            event_id: event.id.clone(),
            outcome,
        }
    }
}
