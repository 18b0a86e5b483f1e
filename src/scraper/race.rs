//! Race assembly: metadata from the URL slug and body text, runner
//! extraction, result overlay, non-starter filtering.
//!
//! Programme URLs look like
//! `/partants-pmu/2026-02-15-vincennes-pmu-prix-de-grenade_c1633331`:
//! date, venue, a literal `-pmu-`, the race name, and a numeric page id.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use super::fields::{classify_discipline, parse_integer, Discipline};
use super::page::PageContent;
use super::results::merge_results;
use super::runners::{apply_handicaps, extract_runners, Runner};
use super::tables::{classify_tables, RunnersPick};

/// Assembled race: metadata plus the retained (starting) runners.
#[derive(Debug, Clone)]
pub struct RaceCard {
    pub name: String,
    /// Race date, with start time when one was found on the page.
    pub date: NaiveDateTime,
    pub venue: String,
    pub discipline: Discipline,
    pub distance: Option<u32>,
    pub purse: Option<i64>,
    pub track_condition: Option<String>,
    /// Not published on geny pages today; kept for the store schema.
    pub weather: Option<String>,
    pub starter_count: u32,
    pub runners: Vec<Runner>,
}

/// Title-case a slug fragment: "prix-de-grenade" -> "Prix De Grenade".
pub(crate) fn title_case(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Split a programme URL into (race name, venue), both slug-decoded.
/// Either may come back empty when the slug does not carry it.
pub(crate) fn slug_parts(url: &str, date_str: &str) -> (String, String) {
    let slug = url.rsplit('/').next().unwrap_or("");
    // Drop the trailing numeric page id: "..._c1633331"
    let slug = match slug.rsplit_once("_c") {
        Some((head, _)) => head,
        None => slug,
    };
    let after_date = slug.replace(&format!("{date_str}-"), "");

    match after_date.split_once("-pmu-") {
        Some((venue, name)) => (title_case(name), title_case(venue)),
        None => {
            let venue = after_date.split('-').next().unwrap_or("");
            (String::new(), title_case(venue))
        }
    }
}

/// Boilerplate pages (cookie/privacy interstitials) masquerade as race
/// names; the substring check is crude but matches what the site serves.
fn is_boilerplate(text: &str) -> bool {
    text.to_lowercase().contains("privacy")
}

fn find_distance(body: &str) -> Option<u32> {
    let re = Regex::new(r"(?i)(\d[\d\s\u{a0}]*)\s*m(?:etres?)?(?:\s|$)").unwrap();
    re.captures(body)
        .and_then(|caps| parse_integer(&caps[1]))
        .map(|d| d as u32)
}

fn find_purse(body: &str) -> Option<i64> {
    let euro_word = Regex::new(r"(?i)(\d[\d\s\u{a0}\u{202f}]*)\s*euro").unwrap();
    let euro_sign = Regex::new(r"(\d[\d\s\u{a0}\u{202f}]*)\s*€").unwrap();
    euro_word
        .captures(body)
        .or_else(|| euro_sign.captures(body))
        .and_then(|caps| parse_integer(&caps[1]))
}

fn find_track_condition(body: &str) -> Option<String> {
    let re = Regex::new(r"[Tt]errain\s*[:\-]?\s*([A-Za-zÀ-ÿ]+)").unwrap();
    re.captures(body).map(|caps| caps[1].trim().to_string())
}

/// Start time as an `H:MM`-style token ("13h50") in the first 2000
/// characters of body text.
fn find_start_time(body: &str) -> Option<(u32, u32)> {
    let head: String = body.chars().take(2000).collect();
    let re = Regex::new(r"(\d{1,2})[hH](\d{2})").unwrap();
    let caps = re.captures(&head)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    Some((hour, minute))
}

/// Assemble a race from its fetched page.
///
/// Best-effort by design: a page with no discoverable structure yields a
/// card with null metadata (and an empty runner list when no runners table
/// was classified), never an error.
pub fn assemble_race(url: &str, date: NaiveDate, page: &PageContent) -> RaceCard {
    let date_str = date.format("%Y-%m-%d").to_string();

    // Name: URL slug wins; fall back to the heading unless that too looks
    // like boilerplate.
    let (slug_name, venue) = slug_parts(url, &date_str);
    let mut name = slug_name;
    if name.is_empty() || is_boilerplate(&name) {
        if let Some(heading) = page.heading.as_deref() {
            let heading = heading.trim();
            if !heading.is_empty() && !is_boilerplate(heading) {
                name = heading.to_string();
            }
        }
    }

    let discipline = classify_discipline(url, &name);
    let mut distance = find_distance(&page.body_text);
    let purse = find_purse(&page.body_text);
    let track_condition = find_track_condition(&page.body_text);

    let mut start = date.and_time(chrono::NaiveTime::MIN);
    if let Some((hour, minute)) = find_start_time(&page.body_text) {
        if let Some(at) = date.and_hms_opt(hour, minute, 0) {
            start = at;
        }
    }

    let classification = classify_tables(&page.tables);
    let mut runners: BTreeMap<u32, Runner> = match classification.runners {
        RunnersPick::Classified(i) => extract_runners(&page.tables[i]),
        RunnersPick::Fallback(i) => {
            warn!(url, "no runners table classified; falling back to table #{i}");
            extract_runners(&page.tables[i])
        }
        RunnersPick::NotFound => {
            warn!(url, "no runners table found");
            BTreeMap::new()
        }
    };

    // Handicaps are computed before the result overlay so synthesized
    // finishers cannot shift the base distance.
    if let Some(base) = apply_handicaps(&mut runners) {
        if distance.is_none() {
            distance = Some(base);
        }
    }

    if let Some(i) = classification.results {
        merge_results(&page.tables[i], &mut runners);
    }

    let runners: Vec<Runner> = runners
        .into_values()
        .filter(|r| !r.non_starter && !r.horse_name.trim().is_empty())
        .collect();

    RaceCard {
        name,
        date: start,
        venue,
        discipline,
        distance,
        purse,
        track_condition,
        weather: None,
        starter_count: runners.len() as u32,
        runners,
    }
}
