//! Field-level parsers for geny.com cell text.
//!
//! Geny renders numbers with French locale conventions (decimal comma,
//! space-grouped thousands, non-breaking spaces) and decorates names with a
//! private-use icon font. Every parser here is pure and returns `Option`:
//! a cell that does not match its expected shape yields `None` and never
//! aborts the surrounding row.

use std::sync::LazyLock;

use regex::Regex;

/// Racing discipline, inferred from URL and race-name keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    Trot,
    Flat,
    Obstacle,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Trot => "Trot",
            Discipline::Flat => "Flat",
            Discipline::Obstacle => "Obstacle",
        }
    }
}

static SEX_AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)(\d+)").unwrap());

// Whole token only: minutes ' seconds '' tenths, e.g. 1'13''8.
static TIME_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+'\d{1,2}''\d+$").unwrap());

/// Parse a locale-formatted number: decimal comma, optional space or
/// non-breaking-space thousands grouping.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .replace(',', ".")
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse an integer by keeping digits only ("2 700 m" -> 2700).
pub fn parse_integer(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse the SA column (sex + age): "F8" -> ("F", 8), "H7" -> ("H", 7).
///
/// Only a leading letter code followed by digits is recognized; the code is
/// recorded verbatim upper-cased, nothing is mapped.
pub fn parse_sex_age(text: &str) -> Option<(String, u32)> {
    let caps = SEX_AGE_RE.captures(text.trim())?;
    let age = caps[2].parse().ok()?;
    Some((caps[1].to_uppercase(), age))
}

/// Parse a prize amount with space-grouped thousands: "151 180" or
/// "151\u{a0}180" or "151\u{202f}180" -> 151180.0.
pub fn parse_prize_money(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Keep an individual time only in the 1'13''8 shape; anything else is
/// absent rather than stored unvalidated.
pub fn parse_time_split(text: &str) -> Option<String> {
    let t = text.trim();
    if TIME_SPLIT_RE.is_match(t) {
        Some(t.to_string())
    } else {
        None
    }
}

/// Remove the private-use code points of the geny icon font, then trim.
pub fn strip_decorative_glyphs(text: &str) -> String {
    text.chars()
        .filter(|c| !('\u{e900}'..='\u{f8ff}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Cell cleanup applied before any field parsing: icon glyphs removed,
/// newlines flattened to spaces.
pub fn clean_cell(text: &str) -> String {
    strip_decorative_glyphs(&text.replace('\n', " "))
}

/// Classify the discipline from URL path and race name keywords.
/// Trot is the default when nothing matches.
pub fn classify_discipline(url_path: &str, title: &str) -> Discipline {
    let t = format!("{url_path} {title}").to_lowercase();
    if t.contains("trot") {
        Discipline::Trot
    } else if t.contains("plat") {
        Discipline::Flat
    } else if t.contains("obstacle") || t.contains("haie") || t.contains("steeple") {
        Discipline::Obstacle
    } else {
        Discipline::Trot
    }
}
