//! The operator's selection, kept by event id so that it survives filter
//! changes that hide selected events.

use std::collections::BTreeSet;

use crate::event::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Add the event if it is not selected, remove it if it is.
    pub fn toggle(mut self, event: &Event) -> Self {
        if !self.ids.remove(&event.id) {
            self.ids.insert(event.id.clone());
        }
        self
    }

    /// Header-checkbox toggle scoped to the visible set: deselects exactly the
    /// visible events when they are all selected, otherwise selects them all.
    /// Hidden events keep their state either way.
    pub fn select_all_visible<'a, I>(mut self, visible: I, currently_all_selected: bool) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in visible {
            if currently_all_selected {
                self.ids.remove(&event.id);
            } else {
                self.ids.insert(event.id.clone());
            }
        }
        self
    }

    /// True when `visible` is non-empty and every visible event is selected.
    /// An empty view is never "all selected".
    pub fn all_visible_selected<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut any_visible = false;
        for event in visible {
            if !self.contains(&event.id) {
                return false;
            }
            any_visible = true;
        }
        any_visible
    }

    /// Drop ids that no longer exist in `events`.
    pub fn retain_existing(mut self, events: &[Event]) -> Self {
        let existing: BTreeSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
        self.ids.retain(|id| existing.contains(id.as_str()));
        self
    }

    /// Selected events, in collection order.
    pub fn selected_events<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.contains(&e.id)).collect()
    }
}
