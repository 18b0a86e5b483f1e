//! CLI commands for the turf scraper.
//!
//! One scraping binary, four modes: a single date, the last N days, an
//! explicit date range, and a schema dump for manual database setup.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "turf-scraper")]
#[command(version, about = "Geny.com race scraper feeding a PostgreSQL turf database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a single day's programme
    Date {
        /// Day to scrape (YYYY-MM-DD)
        #[arg(value_name = "DATE")]
        date: NaiveDate,
    },

    /// Scrape the last N days, today included
    History {
        /// Number of days to go back
        #[arg(short, long, default_value_t = 7)]
        days: i64,
    },

    /// Scrape an inclusive date range
    Range {
        /// First day (YYYY-MM-DD)
        #[arg(value_name = "START")]
        start: NaiveDate,

        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(value_name = "END")]
        end: Option<NaiveDate>,
    },

    /// Print the database schema and exit
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_command() {
        let cli = Cli::try_parse_from(["turf-scraper", "date", "2026-02-15"]).unwrap();
        match cli.command {
            Commands::Date { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
            }
            _ => panic!("expected date command"),
        }
    }

    #[test]
    fn test_parse_history_default() {
        let cli = Cli::try_parse_from(["turf-scraper", "history"]).unwrap();
        match cli.command {
            Commands::History { days } => assert_eq!(days, 7),
            _ => panic!("expected history command"),
        }
    }

    #[test]
    fn test_parse_range_open_end() {
        let cli = Cli::try_parse_from(["turf-scraper", "range", "2026-02-01"]).unwrap();
        match cli.command {
            Commands::Range { start, end } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
                assert_eq!(end, None);
            }
            _ => panic!("expected range command"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["turf-scraper", "date", "15/02/2026"]).is_err());
    }
}
