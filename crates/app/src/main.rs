use std::sync::Arc;

use clap::{Parser, Subcommand};
use mastery_core::model::SessionKind;
use services::{Clock, DEFAULT_TREND_LEN, HistoryService};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod prompt;

use commands::{DrillArgs, SumsArgs, TableArgs};
use prompt::Prompt;

#[derive(Debug, Parser)]
#[command(name = "mastery", version, about = "Mental arithmetic practice")]
struct Cli {
    /// SQLite database URL or file path
    #[arg(long, global = true, env = "MASTERY_DB_URL", default_value = config::DEFAULT_DB_URL)]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a batch of generated problems
    Drill(DrillArgs),

    /// Fill a cross table of row and column headers
    Table(TableArgs),

    /// Sum the rows, columns, and total of a grid
    Sums(SumsArgs),

    /// List saved sessions by day
    History {
        /// Only this kind (an operation or face-two)
        #[arg(long)]
        kind: Option<SessionKind>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Totals and the recent accuracy trend
    Stats {
        /// Only this kind (an operation or face-two)
        #[arg(long)]
        kind: Option<SessionKind>,

        /// Sessions in the trend
        #[arg(long, default_value_t = DEFAULT_TREND_LEN)]
        last: usize,
    },

    /// Delete every saved session
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Record sample sessions for trying out history views
    Seed {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=500))]
        count: u16,
    },
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Open + migrate SQLite here so services stay storage-agnostic.
    let db_url = config::normalize_sqlite_url(&cli.db);
    config::prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;
    tracing::debug!(db_url, "storage ready");

    let history = HistoryService::new(Clock::system(), Arc::clone(&storage.results));
    let mut prompt = Prompt::stdio();

    match cli.command {
        Command::Drill(args) => commands::drill(&args, &history, &mut prompt).await,
        Command::Table(args) => commands::table(&args, &history, &mut prompt).await,
        Command::Sums(args) => commands::sums(&args, &history, &mut prompt).await,
        Command::History { kind, json } => {
            commands::history(kind, json, &history, &mut prompt).await
        }
        Command::Stats { kind, last } => commands::stats(kind, last, &history, &mut prompt).await,
        Command::Clear { yes } => commands::clear(yes, &history, &mut prompt).await,
        Command::Seed { count } => commands::seed(count, &history, &mut prompt).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
