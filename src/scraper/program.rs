//! Daily programme page: one link per race, all pointing at
//! `/partants-pmu/` slugs.

use std::collections::HashSet;

use scraper::{Html, Selector};

use super::race::slug_parts;
use super::BASE_URL;

/// A race discovered on a programme page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceLink {
    pub url: String,
    pub venue: String,
}

/// Collect the race links from a programme page, deduplicated and in
/// document order. The venue is decoded from each slug so the caller can
/// log per-meeting progress without fetching anything.
pub fn parse_program(html: &str, date_str: &str) -> Vec<RaceLink> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse("a[href*='/partants-pmu/']").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&link_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{BASE_URL}{href}")
        };
        if !seen.insert(url.clone()) {
            continue;
        }
        let (_, venue) = slug_parts(&url, date_str);
        links.push(RaceLink { url, venue });
    }
    links
}
