mod commands;
mod context;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{EditArgs, FilterArgs};

#[derive(Parser)]
#[command(name = "calbulk")]
#[command(about = "Filter, bulk-edit and bulk-delete upcoming Google Calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with Google
    Auth,
    /// List the calendars of the signed-in account
    Calendars,
    /// Show upcoming events matching the filters
    Events {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Apply the same edit to every selected event
    Update {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        edit: EditArgs,

        /// Show the resulting events without sending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete every selected event
    Delete {
        #[command(flatten)]
        filter: FilterArgs,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Calendars => commands::calendars::run().await,
        Commands::Events { filter } => commands::events::run(filter).await,
        Commands::Update {
            filter,
            edit,
            dry_run,
        } => commands::update::run(filter, edit.into_draft(), dry_run).await,
        Commands::Delete { filter, yes } => commands::delete::run(filter, yes).await,
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
