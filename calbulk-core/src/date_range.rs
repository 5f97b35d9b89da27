//! Time window for filtering events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::TemporalError;
use crate::temporal::{local_to_utc, parse_draft_date, start_of_local_day};

/// Inclusive window for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        DateRange::default()
    }

    /// Parse window bounds given on the command line, in the operator's zone.
    /// - `from`: YYYY-MM-DD (start of that day) or YYYY-MM-DDTHH:MM
    /// - `to`: YYYY-MM-DD (end of that day) or YYYY-MM-DDTHH:MM
    pub fn from_args(from: Option<&str>, to: Option<&str>, tz: &Tz) -> Result<Self, TemporalError> {
        let from = from.map(|s| parse_bound(s, Edge::Start, tz)).transpose()?;
        let to = to.map(|s| parse_bound(s, Edge::End, tz)).transpose()?;

        Ok(DateRange { from, to })
    }

    pub fn contains_start(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from)
    }

    pub fn contains_end(&self, instant: DateTime<Utc>) -> bool {
        self.to.is_none_or(|to| instant <= to)
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Start,
    End,
}

fn parse_bound(s: &str, edge: Edge, tz: &Tz) -> Result<DateTime<Utc>, TemporalError> {
    let s = s.trim();

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_utc(naive, tz);
        }
    }

    let date = parse_draft_date(s)?;
    Ok(match edge {
        Edge::Start => start_of_local_day(date, tz),
        Edge::End => end_of_local_day(date, tz)?,
    })
}

/// Last second of `date` in `tz`.
fn end_of_local_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, TemporalError> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_to_utc(date.and_time(last_second), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn date_only_bounds_cover_whole_local_days() {
        let range = DateRange::from_args(Some("2024-06-01"), Some("2024-06-02"), &New_York).unwrap();

        // New York is UTC-4 in June
        assert_eq!(range.from, Some(Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap()));
        assert_eq!(range.to, Some(Utc.with_ymd_and_hms(2024, 6, 3, 3, 59, 59).unwrap()));
    }

    #[test]
    fn bounds_with_time_are_exact() {
        let range = DateRange::from_args(Some("2024-06-01T09:30"), None, &chrono_tz::UTC).unwrap();

        assert_eq!(range.from, Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()));
        assert_eq!(range.to, None);
    }

    #[test]
    fn invalid_bound_is_an_error() {
        let result = DateRange::from_args(Some("next tuesday"), None, &chrono_tz::UTC);

        assert_eq!(result, Err(TemporalError::InvalidDate("next tuesday".to_string())));
    }

    #[test]
    fn missing_bounds_contain_everything() {
        let range = DateRange::unbounded();
        let instant = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();

        assert!(range.contains_start(instant));
        assert!(range.contains_end(instant));
    }
}
