use anyhow::Result;
use calbulk_core::service::load_calendars;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;
use crate::utils::tui;

pub async fn run() -> Result<()> {
    let ctx = Context::load().await?;

    let spinner = tui::create_spinner("Fetching calendars...".to_string());
    let calendars = load_calendars(&ctx.service).await;
    spinner.finish_and_clear();

    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for calendar in &calendars {
        println!("{}", calendar.render());
        println!("   {}", calendar.id.dimmed());
    }

    Ok(())
}
