pub mod auth;
pub mod calendars;
pub mod delete;
pub mod events;
pub mod update;

use anyhow::Result;
use calbulk_core::date_range::DateRange;
use calbulk_core::draft::EditDraft;
use calbulk_core::filter::FilterCriteria;
use calbulk_core::service::load_upcoming_events;
use calbulk_core::session::SessionState;
use calbulk_core::Calendar;
use chrono::Utc;
use chrono_tz::Tz;
use clap::Args;
use tracing::warn;

use crate::context::Context;
use crate::render::Render;
use crate::utils::tui;

/// Which events a command works on.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Calendar id or name (defaults to default_calendar from config, then the first calendar)
    #[arg(short, long)]
    pub calendar: Option<String>,

    /// Only events whose title contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Only events starting at or after this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
    #[arg(long)]
    pub from: Option<String>,

    /// Only events ending at or before this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
    #[arg(long)]
    pub to: Option<String>,

    /// Select only this event among the matching ones (repeatable)
    #[arg(long = "id", value_name = "EVENT_ID")]
    pub ids: Vec<String>,

    /// Leave this event out of the selection (repeatable)
    #[arg(long, value_name = "EVENT_ID")]
    pub except: Vec<String>,
}

impl FilterArgs {
    pub fn criteria(&self, tz: &Tz) -> Result<FilterCriteria> {
        let window = DateRange::from_args(self.from.as_deref(), self.to.as_deref(), tz)?;
        Ok(FilterCriteria::new(self.search.clone(), window))
    }

    /// Select every visible event, or only the `--id` ones among them, then
    /// drop the `--except` ones.
    pub fn select(&self, state: SessionState) -> SessionState {
        let state = if self.ids.is_empty() {
            state.toggle_all_visible()
        } else {
            let visible: Vec<String> = state.visible().iter().map(|e| e.id.clone()).collect();

            self.ids.iter().fold(state, |state, id| {
                if !visible.contains(id) {
                    warn!(event = %id, "event is not among the matching events, ignoring");
                    state
                } else if state.selection.contains(id) {
                    state
                } else {
                    state.toggle_event(id)
                }
            })
        };

        self.except.iter().fold(state, |state, id| {
            if state.selection.contains(id) {
                state.toggle_event(id)
            } else {
                state
            }
        })
    }
}

/// The edit applied by `calbulk update`. Flags left out are not changed.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// New start time (HH:MM); keeps each event's date unless --start-date is given
    #[arg(long)]
    pub start_time: Option<String>,

    /// New end date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// New end time (HH:MM); keeps each event's date unless --end-date is given
    #[arg(long)]
    pub end_time: Option<String>,

    /// Make the events all-day (times are ignored)
    #[arg(long)]
    pub all_day: bool,
}

impl EditArgs {
    pub fn into_draft(self) -> EditDraft {
        EditDraft {
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            start_time: self.start_time,
            end_date: self.end_date,
            end_time: self.end_time,
            all_day: self.all_day,
        }
        .normalized()
    }
}

/// Resolve the calendar, fetch its upcoming events and apply the filter flags.
pub async fn load_session(ctx: &Context, filter: &FilterArgs) -> Result<(Calendar, SessionState)> {
    let criteria = filter.criteria(&ctx.tz)?;
    let calendar = ctx.calendar(filter.calendar.as_deref()).await?;

    let spinner = tui::create_spinner(calendar.render());
    let events = load_upcoming_events(&ctx.service, &calendar.id, Utc::now()).await;
    spinner.finish_and_clear();

    let state = SessionState::new(events, ctx.tz).with_criteria(criteria);
    Ok((calendar, state))
}
