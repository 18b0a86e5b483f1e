//! Scraping pipeline: one browser, one store, day by day.
//!
//! Extraction stays synchronous and pure; the only suspension points are
//! page fetches and store writes. A failed race or day is logged and the
//! pass moves on, so a long backfill survives transient page breakage.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::scraper::program::{parse_program, RaceLink};
use crate::scraper::{assemble_race, program_url, Browser, PageContent};
use crate::storage::Store;

/// Scrape every day from `start` to `end` inclusive.
pub async fn run(config: &AppConfig, start: NaiveDate, end: NaiveDate) -> Result<()> {
    let store = Store::connect(&config.db).await?;
    let browser = Browser::launch().await?;

    let total = (end - start).num_days() + 1;
    let mut day = start;
    let mut index = 0;
    while day <= end {
        index += 1;
        info!("day {index}/{total}: {day}");
        if let Err(e) = scrape_day(config, &browser, &store, day).await {
            error!(date = %day, "day failed: {e:#}");
        }
        day += Duration::days(1);
        if day <= end {
            sleep(TokioDuration::from_secs(config.scrape.day_pause_secs)).await;
        }
    }

    browser.close().await?;
    Ok(())
}

async fn scrape_day(
    config: &AppConfig,
    browser: &Browser,
    store: &Store,
    date: NaiveDate,
) -> Result<()> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let html = fetch(config, browser, &program_url(date)).await?;
    let links = parse_program(&html, &date_str);
    info!(date = %date, races = links.len(), "programme parsed");

    let mut saved = 0;
    for link in &links {
        match scrape_race(config, browser, store, link, date).await {
            Ok(()) => saved += 1,
            Err(e) => error!(url = %link.url, "race failed: {e:#}"),
        }
        sleep(TokioDuration::from_secs(config.scrape.race_pause_secs)).await;
    }
    info!(date = %date, saved, "day done");
    Ok(())
}

async fn scrape_race(
    config: &AppConfig,
    browser: &Browser,
    store: &Store,
    link: &RaceLink,
    date: NaiveDate,
) -> Result<()> {
    let html = fetch(config, browser, &link.url).await?;
    let page = PageContent::from_html(&html);
    let card = assemble_race(&link.url, date, &page);
    if card.runners.is_empty() {
        info!(url = %link.url, "no runners extracted");
    }
    // Best-effort partial data is still persisted: a race with nothing but
    // its identity produces a race row with an empty runner set.
    store.save_race(&card).await
}

/// Fetch with the configured hard deadline so one stuck page cannot hang
/// a whole backfill. The deadline lives inside `fetch_page`, which also
/// closes the tab on the timeout path.
async fn fetch(config: &AppConfig, browser: &Browser, url: &str) -> Result<String> {
    browser
        .fetch_page(url, TokioDuration::from_secs(config.scrape.page_timeout_secs))
        .await
        .with_context(|| format!("fetching {url}"))
}
