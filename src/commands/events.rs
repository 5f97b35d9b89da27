use anyhow::Result;
use owo_colors::OwoColorize;

use super::{FilterArgs, load_session};
use crate::context::Context;
use crate::render::{Render, render_event_list};

pub async fn run(filter: FilterArgs) -> Result<()> {
    let ctx = Context::load().await?;
    let (calendar, state) = load_session(&ctx, &filter).await?;

    println!("{}\n", calendar.render());

    let visible = state.visible();
    if visible.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    println!("{}", render_event_list(&visible, &ctx.tz));
    println!(
        "\n{}",
        format!("{} of {} upcoming events", visible.len(), state.events.len()).dimmed()
    );

    Ok(())
}
