//! Everything one bulk-editing session tracks between batches.

use chrono_tz::Tz;

use crate::dispatch::{BatchKind, BatchReport};
use crate::event::Event;
use crate::filter::{FilterCriteria, filter_events};
use crate::selection::Selection;

/// Loaded events, the selection, the active filter and the ids that failed
/// in the last batch. Updates consume the state and return the next one.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub events: Vec<Event>,
    pub selection: Selection,
    pub criteria: FilterCriteria,
    pub failed: Vec<String>,
    pub tz: Tz,
}

impl SessionState {
    pub fn new(events: Vec<Event>, tz: Tz) -> Self {
        SessionState {
            events,
            selection: Selection::new(),
            criteria: FilterCriteria::default(),
            failed: Vec::new(),
            tz,
        }
    }

    /// Change the filter. The selection is kept as is.
    pub fn with_criteria(self, criteria: FilterCriteria) -> Self {
        SessionState { criteria, ..self }
    }

    pub fn visible(&self) -> Vec<&Event> {
        filter_events(&self.events, &self.criteria, &self.tz).collect()
    }

    pub fn all_visible_selected(&self) -> bool {
        self.selection.all_visible_selected(self.visible())
    }

    pub fn toggle_event(self, event_id: &str) -> Self {
        let Some(event) = self.events.iter().find(|e| e.id == event_id).cloned() else {
            return self;
        };
        SessionState {
            selection: self.selection.toggle(&event),
            ..self
        }
    }

    /// Header checkbox: select or deselect everything currently visible.
    pub fn toggle_all_visible(self) -> Self {
        let all = self.all_visible_selected();
        let selection = self
            .selection
            .clone()
            .select_all_visible(filter_events(&self.events, &self.criteria, &self.tz), all);
        SessionState { selection, ..self }
    }

    /// Selected events in collection order, visible or not.
    pub fn selected_events(&self) -> Vec<Event> {
        self.selection
            .selected_events(&self.events)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Fold a finished batch back in.
    ///
    /// After an edit the report holds only the batch's events, so they replace
    /// their counterparts in place. After a delete the report holds the
    /// refetched collection, which replaces everything.
    pub fn with_batch(self, report: &BatchReport) -> Self {
        let failed = report.failed_ids().into_iter().map(String::from).collect();

        let events = match report.kind {
            BatchKind::Delete => report.events.clone(),
            BatchKind::Edit => self
                .events
                .into_iter()
                .map(|event| {
                    report
                        .events
                        .iter()
                        .find(|updated| updated.id == event.id)
                        .cloned()
                        .unwrap_or(event)
                })
                .collect()
        };

        let selection = self.selection.retain_existing(&events);

        SessionState {
            events,
            selection,
            failed,
            ..self
        }
    }
}
