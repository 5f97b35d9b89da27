//! Terminal rendering for calbulk types.
//!
//! Extension traits that add colored output to calbulk-core types using
//! owo_colors. Event times are shown in the operator's time zone.

use calbulk_core::dispatch::{BatchReport, Outcome};
use calbulk_core::{Calendar, Event, EventTime};
use chrono::Utc;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Rendering that depends on the operator's time zone.
pub trait RenderIn {
    fn render_in(&self, tz: &Tz) -> String;
}

impl Render for Calendar {
    fn render(&self) -> String {
        if self.primary {
            format!("📅 {} {}", self.name, "(primary)".dimmed())
        } else {
            format!("📅 {}", self.name)
        }
    }
}

impl RenderIn for EventTime {
    fn render_in(&self, tz: &Tz) -> String {
        match self {
            EventTime::Date(date) => date.format("%Y-%m-%d").to_string(),
            EventTime::DateTime(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl RenderIn for Event {
    fn render_in(&self, tz: &Tz) -> String {
        let summary = if self.summary.is_empty() {
            "(No title)".to_string()
        } else {
            self.summary.clone()
        };
        format!("{} {} {}", format_time(self, tz), summary, self.id.dimmed())
    }
}

/// Events grouped under a label per local day, in the order given.
pub fn render_event_list(events: &[&Event], tz: &Tz) -> String {
    let mut lines = Vec::new();
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = format_date_label(&event.start, tz);

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date_label.bold().to_string());
            current_date = Some(date_label);
        }

        lines.push(format!("  {}", event.render_in(tz)));
    }

    lines.join("\n")
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(time: &EventTime, tz: &Tz) -> String {
    let today = Utc::now().with_timezone(tz).date_naive();
    let date = time.local_date(tz);

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Format the time span of an event (e.g. "15:00-16:30" or "all-day")
fn format_time(event: &Event, tz: &Tz) -> String {
    match (&event.start, &event.end) {
        (EventTime::Date(_), _) => format!("{:>11}", "all-day"),
        (EventTime::DateTime(start), Some(EventTime::DateTime(end))) => format!(
            "{}-{}",
            start.with_timezone(tz).format("%H:%M"),
            end.with_timezone(tz).format("%H:%M")
        ),
        (EventTime::DateTime(start), _) => format!("{:>11}", start.with_timezone(tz).format("%H:%M")),
    }
}

/// Field-by-field changes between an event and its edited version.
pub fn render_changes(old: &Event, new: &Event, tz: &Tz) -> Vec<String> {
    let mut lines = Vec::new();

    if old.summary != new.summary {
        lines.push(format!("{}: {} → {}", "summary".dimmed(), old.summary.red(), new.summary.green()));
    }
    if old.description != new.description {
        let old_str = old.description.as_deref().unwrap_or("(none)");
        let new_str = new.description.as_deref().unwrap_or("(none)");
        lines.push(format!("{}: {} → {}", "description".dimmed(), old_str.red(), new_str.green()));
    }
    if old.start != new.start {
        lines.push(format!(
            "{}: {} → {}",
            "start".dimmed(),
            old.start.render_in(tz).red(),
            new.start.render_in(tz).green()
        ));
    }
    if old.end != new.end {
        let render = |end: &Option<EventTime>| {
            end.map(|t| t.render_in(tz))
                .unwrap_or_else(|| "(none)".to_string())
        };
        lines.push(format!(
            "{}: {} → {}",
            "end".dimmed(),
            render(&old.end).red(),
            render(&new.end).green()
        ));
    }

    lines
}

/// One line per outcome, labelled with the event as it was before the batch.
pub fn render_outcomes(report: &BatchReport, before: &[Event], tz: &Tz) -> String {
    report
        .outcomes
        .iter()
        .map(|outcome| {
            let label = before
                .iter()
                .find(|e| e.id == outcome.event_id)
                .map(|e| e.render_in(tz))
                .unwrap_or_else(|| outcome.event_id.clone());

            match &outcome.outcome {
                Outcome::Updated(_) => format!("   {} {}", "~".yellow(), label),
                Outcome::Deleted => format!("   {} {}", "-".red(), label),
                Outcome::Failed(e) => format!(
                    "   {} {}\n      {}",
                    "✗".red(),
                    label,
                    e.to_string().red()
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
