use anyhow::Result;
use calbulk_core::dispatch::{BatchStatus, Dispatcher};
use calbulk_core::draft::EditDraft;
use calbulk_core::patch::EventPatch;
use calbulk_core::Event;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use super::{FilterArgs, load_session};
use crate::context::Context;
use crate::render::{Render, RenderIn, pluralize, render_changes, render_outcomes};
use crate::utils::tui;

pub async fn run(filter: FilterArgs, draft: EditDraft, dry_run: bool) -> Result<()> {
    let ctx = Context::load().await?;
    let (calendar, state) = load_session(&ctx, &filter).await?;
    let state = filter.select(state);
    let selected = state.selected_events();

    println!("{}", calendar.render());

    if selected.is_empty() {
        println!("   {}", "No events selected".dimmed());
        return Ok(());
    }

    if draft.is_empty() {
        println!("   {}", "Nothing to change, events are sent unmodified".dimmed());
    }

    if dry_run {
        println!("{}", render_preview(&selected, &draft, &ctx.tz));
        return Ok(());
    }

    let spinner = tui::create_spinner(format!(
        "Updating {} {}...",
        selected.len(),
        pluralize("event", selected.len())
    ));
    let report = Dispatcher::new(&ctx.service, &calendar.id)
        .with_concurrency(ctx.config.concurrency)
        .apply_edit(&selected, &draft, &ctx.tz)
        .await;
    spinner.finish_and_clear();

    println!("{}", render_outcomes(&report, &selected, &ctx.tz));

    let state = state.with_batch(&report);

    match report.status() {
        BatchStatus::Success | BatchStatus::Empty => {
            println!(
                "\nUpdated {} {}",
                report.succeeded(),
                pluralize("event", report.succeeded())
            );
            Ok(())
        }
        BatchStatus::PartialFailure | BatchStatus::TotalFailure => anyhow::bail!(
            "{} of {} updates failed: {}",
            state.failed.len(),
            report.outcomes.len(),
            state.failed.join(", ")
        ),
    }
}

/// What each selected event would become, without sending anything.
fn render_preview(selected: &[Event], draft: &EditDraft, tz: &Tz) -> String {
    let mut lines = Vec::new();

    for event in selected {
        lines.push(format!("   {}", event.render_in(tz)));

        match EventPatch::build(event, draft, tz) {
            Ok(patch) => {
                let changes = render_changes(event, &patch.apply_to(event), tz);
                if changes.is_empty() {
                    lines.push(format!("      {}", "(no changes)".dimmed()));
                }
                lines.extend(changes.into_iter().map(|l| format!("      {}", l)));
            }
            Err(e) => lines.push(format!("      {}", e.to_string().red())),
        }
    }

    lines.join("\n")
}
