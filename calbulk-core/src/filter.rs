//! Free-text and time-window filtering of an event collection.

use chrono_tz::Tz;

use crate::date_range::DateRange;
use crate::event::Event;

/// What the operator is currently looking for. A pure view projection:
/// filtering never changes events or the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the summary; empty matches everything.
    pub search: String,
    pub window: DateRange,
}

impl FilterCriteria {
    pub fn new(search: impl Into<String>, window: DateRange) -> Self {
        FilterCriteria {
            search: search.into(),
            window,
        }
    }

    pub fn matches(&self, event: &Event, tz: &Tz) -> bool {
        self.matches_search(event)
            && self.window.contains_start(event.start_instant(tz))
            && self.window.contains_end(event.end_instant(tz))
    }

    fn matches_search(&self, event: &Event) -> bool {
        self.search.is_empty()
            || event
                .summary
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }
}

/// Lazily yield the events passing `criteria`, in collection order.
pub fn filter_events<'a>(
    events: &'a [Event],
    criteria: &'a FilterCriteria,
    tz: &'a Tz,
) -> impl Iterator<Item = &'a Event> + 'a {
    events.iter().filter(move |event| criteria.matches(event, tz))
}

/// The visible set, materialized.
pub fn visible(events: &[Event], criteria: &FilterCriteria, tz: &Tz) -> Vec<Event> {
    filter_events(events, criteria, tz).cloned().collect()
}
