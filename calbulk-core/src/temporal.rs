//! Merging edit drafts onto event times.
//!
//! A draft carries raw form values (`YYYY-MM-DD`, `HH:MM`) and an all-day
//! flag. Resolution happens per event and per boundary, because the missing
//! half of a date/time pair is taken from the event's existing value.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::TemporalError;
use crate::event::EventTime;

/// Parse a draft date (`YYYY-MM-DD`).
pub fn parse_draft_date(s: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TemporalError::InvalidDate(s.to_string()))
}

/// Parse a draft time (`HH:MM` or `HH:MM:SS`).
pub fn parse_draft_time(s: &str) -> Result<NaiveTime, TemporalError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| TemporalError::InvalidTime(s.to_string()))
}

/// Resolve a wall-clock time in `tz` to an absolute instant.
///
/// Ambiguous times (DST fold) take the earlier instant; times inside a DST
/// gap are rejected.
pub fn local_to_utc(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Utc>, TemporalError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TemporalError::NonexistentLocalTime(naive, tz.name().to_string()))
}

/// First instant of `date` in `tz`.
///
/// A few zones skip midnight on DST changes, so this walks forward to the
/// first hour that exists.
pub fn start_of_local_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    (0..=3)
        .map(|hours| midnight + Duration::hours(hours))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Merge one boundary of a draft onto the `existing` value.
///
/// Returns `None` when the draft requests no change for this boundary:
/// an all-day edit without a date, or a timed edit with neither date nor time.
pub fn resolve_merge(
    existing: &EventTime,
    draft_date: Option<&str>,
    draft_time: Option<&str>,
    all_day: bool,
    tz: &Tz,
) -> Result<Option<EventTime>, TemporalError> {
    let draft_date = draft_date.map(parse_draft_date).transpose()?;

    if all_day {
        return Ok(draft_date.map(EventTime::Date));
    }

    let draft_time = draft_time.map(parse_draft_time).transpose()?;

    if draft_date.is_none() && draft_time.is_none() {
        return Ok(None);
    }

    let date = draft_date.unwrap_or_else(|| existing.local_date(tz));
    let time = draft_time.unwrap_or_else(|| existing.local_time(tz));

    let instant = local_to_utc(date.and_time(time), tz)?;
    Ok(Some(EventTime::DateTime(instant)))
}

/// Make a resolved start/end pair agree on shape.
///
/// When only one boundary was resolved and it changed shape, the untouched
/// boundary is converted from its existing value so the event never ends up
/// with an all-day start beside a timed end (or the reverse).
pub fn align_shapes(
    existing_start: &EventTime,
    existing_end: Option<&EventTime>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    tz: &Tz,
) -> (Option<EventTime>, Option<EventTime>) {
    match (start, end) {
        (Some(start), None) => {
            let end = existing_end
                .filter(|existing| existing.is_all_day() != start.is_all_day())
                .map(|existing| coerce_end(existing, &start, tz));
            (Some(start), end)
        }
        (None, Some(end)) if existing_start.is_all_day() != end.is_all_day() => {
            (Some(coerce_start(existing_start, end.is_all_day(), tz)), Some(end))
        }
        other => other,
    }
}

fn coerce_start(existing: &EventTime, to_all_day: bool, tz: &Tz) -> EventTime {
    match (existing, to_all_day) {
        (EventTime::DateTime(_), true) => EventTime::Date(existing.local_date(tz)),
        (EventTime::Date(date), false) => EventTime::DateTime(start_of_local_day(*date, tz)),
        _ => *existing,
    }
}

/// All-day ends are exclusive: a timed end after local midnight rounds up to
/// the next date, and the end always lands after the start date.
fn coerce_end(existing: &EventTime, start: &EventTime, tz: &Tz) -> EventTime {
    match (existing, start) {
        (EventTime::DateTime(_), EventTime::Date(start_date)) => {
            let mut date = existing.local_date(tz);
            if existing.local_time(tz) != NaiveTime::MIN {
                date = date.succ_opt().unwrap_or(date);
            }
            let earliest = start_date.succ_opt().unwrap_or(*start_date);
            EventTime::Date(date.max(earliest))
        }
        (EventTime::Date(date), EventTime::DateTime(_)) => {
            EventTime::DateTime(start_of_local_day(*date, tz))
        }
        _ => *existing,
    }
}
