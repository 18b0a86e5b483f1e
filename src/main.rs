//! Geny.com → PostgreSQL race scraper
//!
//! Scrapes daily programme and result pages into a normalized turf
//! database, idempotently, so pre-race and post-race passes converge.

mod cli;
mod config;
mod pipeline;
mod scraper;
mod storage;

use chrono::{Duration, Local};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turf_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Schema = cli.command {
        println!("{}", storage::SETUP_SQL);
        return Ok(());
    }

    let config = AppConfig::load()?;

    let (start, end) = match cli.command {
        Commands::Date { date } => (date, date),
        Commands::History { days } => {
            let today = Local::now().date_naive();
            (today - Duration::days(days.max(1) - 1), today)
        }
        Commands::Range { start, end } => (start, end.unwrap_or_else(|| Local::now().date_naive())),
        Commands::Schema => unreachable!("handled above"),
    };

    if end < start {
        anyhow::bail!("end date {end} is before start date {start}");
    }

    pipeline::run(&config, start, end).await
}
