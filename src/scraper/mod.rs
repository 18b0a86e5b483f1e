//! Web scraper module for geny.com
//!
//! Provides browser automation, HTML parsing, and race extraction.

pub mod browser;
pub mod fields;
pub mod page;
pub mod program;
pub mod race;
pub mod results;
pub mod runners;
pub mod tables;

pub use browser::Browser;
pub use page::PageContent;
pub use race::{assemble_race, RaceCard};

use chrono::NaiveDate;

/// Base URL for geny.com
pub const BASE_URL: &str = "https://www.geny.com";

/// Build the daily programme URL
pub fn program_url(date: NaiveDate) -> String {
    format!("{}/reunions-courses-pmu?date={}", BASE_URL, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_url() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(
            program_url(date),
            "https://www.geny.com/reunions-courses-pmu?date=2026-02-15"
        );
    }
}
