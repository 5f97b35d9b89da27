use anyhow::Result;
use calbulk_core::dispatch::{BatchStatus, Dispatcher};
use chrono::Utc;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::{FilterArgs, load_session};
use crate::context::Context;
use crate::render::{Render, pluralize, render_event_list, render_outcomes};
use crate::utils::tui;

pub async fn run(filter: FilterArgs, yes: bool) -> Result<()> {
    let ctx = Context::load().await?;
    let (calendar, state) = load_session(&ctx, &filter).await?;
    let state = filter.select(state);
    let selected = state.selected_events();

    println!("{}", calendar.render());

    if selected.is_empty() {
        println!("   {}", "No events selected".dimmed());
        return Ok(());
    }

    let refs: Vec<_> = selected.iter().collect();
    println!("{}", render_event_list(&refs, &ctx.tz));

    // Confirm unless --yes
    if !yes {
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} {}?",
                selected.len(),
                pluralize("event", selected.len())
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let spinner = tui::create_spinner(format!(
        "Deleting {} {}...",
        selected.len(),
        pluralize("event", selected.len())
    ));
    let report = Dispatcher::new(&ctx.service, &calendar.id)
        .with_concurrency(ctx.config.concurrency)
        .delete_selected(&selected, Utc::now())
        .await;
    spinner.finish_and_clear();

    println!("\n{}", render_outcomes(&report, &selected, &ctx.tz));

    if let Some(e) = &report.refresh_error {
        println!("   {}", format!("Could not reload events: {e}").yellow());
    }

    let state = state.with_batch(&report);

    match report.status() {
        BatchStatus::Success | BatchStatus::Empty => {
            println!(
                "\nDeleted {} {}, {} upcoming {} left",
                report.succeeded(),
                pluralize("event", report.succeeded()),
                state.events.len(),
                pluralize("event", state.events.len())
            );
            Ok(())
        }
        BatchStatus::PartialFailure | BatchStatus::TotalFailure => anyhow::bail!(
            "{} of {} deletes failed: {}",
            state.failed.len(),
            report.outcomes.len(),
            state.failed.join(", ")
        ),
    }
}
