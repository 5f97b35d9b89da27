use anyhow::Result;
use calbulk_core::config::CalbulkConfig;
use calbulk_provider_google::Session;
use calbulk_provider_google::auth;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    let config = CalbulkConfig::load()?;

    println!("Authenticating with Google...");

    let data = auth::authenticate().await?;

    // Nothing is saved for accounts that may not use calbulk
    config.authorize(&data.email)?;

    let session = Session::new(data)?;
    session.save()?;

    println!("Authenticated as: {}\n", session.email().green());
    println!("Run `calbulk calendars` to see your calendars.");

    Ok(())
}
