//! The edit form: every field is optional and only present fields are applied.

/// A partial edit applied to every event of a batch.
///
/// `None` leaves the attribute untouched. Dates are `YYYY-MM-DD`, times
/// `HH:MM`; they are validated per event when the patch is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub all_day: bool,
}

impl EditDraft {
    /// Treat blank fields as not filled in.
    pub fn normalized(self) -> Self {
        EditDraft {
            title: non_blank(self.title),
            description: non_blank(self.description),
            start_date: non_blank(self.start_date),
            start_time: non_blank(self.start_time),
            end_date: non_blank(self.end_date),
            end_time: non_blank(self.end_time),
            all_day: self.all_day,
        }
    }

    pub fn touches_start(&self) -> bool {
        self.start_date.is_some() || (!self.all_day && self.start_time.is_some())
    }

    pub fn touches_end(&self) -> bool {
        self.end_date.is_some() || (!self.all_day && self.end_time.is_some())
    }

    /// True when applying the draft would send an empty patch.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && !self.touches_start()
            && !self.touches_end()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
