//! Runners ("partants") table extraction.
//!
//! Column layout differs by discipline:
//!   Trot           : N° | Cheval | SA | Dist. | Driver | Entraîneur | Musique | Gains | cotes...
//!   Gallop/Obstacle: N° | Cheval | SA | Dist. | Poids | Jockey | Entraîneur | Musique | Gains | cotes...
//! The weight ("Poids") header is the discriminator.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::fields::{clean_cell, parse_integer, parse_number, parse_prize_money, parse_sex_age};
use super::tables::RaceTable;

/// Role of the person in the sulky or saddle. Part of a person's identity:
/// the same name as driver and as jockey is two distinct store entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderRole {
    Driver,
    Jockey,
}

impl RiderRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiderRole::Driver => "driver",
            RiderRole::Jockey => "jockey",
        }
    }
}

/// One starter, keyed by its starting number within the race.
///
/// Entry fields are filled from the runners table; place, time and final
/// odds arrive later from the results table. Every attribute that can be
/// missing on the page is an explicit `Option`.
#[derive(Debug, Clone)]
pub struct Runner {
    pub number: u32,
    pub horse_name: String,
    pub sex: Option<String>,
    pub age: Option<u32>,
    /// Distance this horse actually runs, as listed (meters).
    pub listed_distance: Option<u32>,
    /// Meters behind the shortest listed distance in the race.
    pub handicap: u32,
    /// Weight carried, gallop/obstacle only (kg).
    pub weight: Option<f64>,
    pub rider: Option<String>,
    pub rider_role: RiderRole,
    pub trainer: Option<String>,
    /// Recent-form string ("musique"), e.g. "8a6a(25)7a".
    pub form: Option<String>,
    /// Career earnings (euros).
    pub earnings: Option<f64>,
    pub morning_odds: Option<f64>,
    pub current_odds: Option<f64>,
    pub finish_place: Option<u32>,
    pub finish_time: Option<String>,
    /// Declared non-starter; tracked during extraction, dropped before
    /// persistence.
    pub non_starter: bool,
}

impl Runner {
    pub fn new(number: u32, rider_role: RiderRole) -> Self {
        Self {
            number,
            horse_name: String::new(),
            sex: None,
            age: None,
            listed_distance: None,
            handicap: 0,
            weight: None,
            rider: None,
            rider_role,
            trainer: None,
            form: None,
            earnings: None,
            morning_odds: None,
            current_odds: None,
            finish_place: None,
            finish_time: None,
            non_starter: false,
        }
    }
}

static NAME_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Horse name is the text before the first run of two-plus spaces; the rest
/// is annotation (shoeing icons, supplement markers).
fn horse_name(cell: &str) -> String {
    NAME_SUFFIX_RE
        .split(cell)
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn non_empty(text: &str) -> Option<String> {
    let t = text.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn is_gallop_layout(table: &RaceTable) -> bool {
    table
        .rows
        .first()
        .map(|row| row.iter().any(|cell| cell.to_lowercase().contains("poids")))
        .unwrap_or(false)
}

/// Parse the runners table into one record per starting number.
///
/// Rows whose first cell is not a pure integer are skipped: that guard
/// drops header and footer rows regardless of how they were rendered.
pub fn extract_runners(table: &RaceTable) -> BTreeMap<u32, Runner> {
    let gallop = is_gallop_layout(table);
    let role = if gallop { RiderRole::Jockey } else { RiderRole::Driver };
    let (idx_rider, idx_trainer, idx_form, idx_earnings, idx_odds) =
        if gallop { (5, 6, 7, 8, 9) } else { (4, 5, 6, 7, 8) };

    let mut runners = BTreeMap::new();

    for row in &table.rows {
        let texts: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
        if texts.len() < 6 {
            continue;
        }
        if texts[0].is_empty() || !texts[0].chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Some(number) = parse_integer(&texts[0]).map(|n| n as u32) else {
            continue;
        };

        let name = horse_name(&texts[1]);
        let (sex, age) = match texts.get(2).and_then(|t| parse_sex_age(t)) {
            Some((s, a)) => (Some(s), Some(a)),
            None => (None, None),
        };
        let listed_distance = texts.get(3).and_then(|t| parse_integer(t)).map(|d| d as u32);
        let weight = if gallop {
            texts.get(4).and_then(|t| parse_number(t))
        } else {
            None
        };

        let rider_cell = texts.get(idx_rider).map(String::as_str).unwrap_or("");
        let non_starter = rider_cell.to_lowercase().contains("non-part")
            || name.to_lowercase().contains("non-part");

        let trainer = texts.get(idx_trainer).and_then(|t| non_empty(t));
        // Form is only kept if it carries at least one digit; anything else
        // is a placeholder cell.
        let form = texts
            .get(idx_form)
            .and_then(|t| non_empty(t))
            .filter(|t| t.chars().any(|c| c.is_ascii_digit()));
        let earnings = texts.get(idx_earnings).and_then(|t| parse_prize_money(t));

        // Odds columns are variable-width and trailing; values at or below
        // 1.0 are rendering artifacts, not prices.
        let odds: Vec<f64> = texts
            .iter()
            .skip(idx_odds)
            .filter_map(|t| parse_number(t))
            .filter(|v| *v > 1.0)
            .collect();
        let morning_odds = if odds.len() >= 2 { Some(odds[0]) } else { None };
        let current_odds = odds.last().copied();

        let mut runner = Runner::new(number, role);
        runner.horse_name = name;
        runner.sex = sex;
        runner.age = age;
        runner.listed_distance = listed_distance;
        runner.weight = weight;
        runner.rider = if non_starter { None } else { non_empty(rider_cell) };
        runner.trainer = trainer;
        runner.form = form;
        runner.earnings = earnings;
        runner.morning_odds = morning_odds;
        runner.current_odds = current_odds;
        runner.non_starter = non_starter;

        runners.insert(number, runner);
    }

    runners
}

/// Recompute distance handicaps against the shortest listed distance and
/// return that base distance (the race distance when nothing else set it).
pub fn apply_handicaps(runners: &mut BTreeMap<u32, Runner>) -> Option<u32> {
    let base = runners.values().filter_map(|r| r.listed_distance).min()?;
    for runner in runners.values_mut() {
        if let Some(d) = runner.listed_distance {
            runner.handicap = d.saturating_sub(base);
        }
    }
    Some(base)
}
