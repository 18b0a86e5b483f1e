//! Results table overlay.
//!
//! Layout: Rg. | N° | Chevaux | SA | Dist. | Drivers | Entraineurs | Chronos | Cotes
//!
//! Finishing place, individual time and final odds are merged onto the
//! already-extracted runners by starting number. A finisher missing from the
//! runners table (a rare site inconsistency) gets a synthetic record built
//! from the results row alone.

use std::collections::BTreeMap;

use super::fields::{clean_cell, parse_integer, parse_number, parse_sex_age, parse_time_split};
use super::runners::{RiderRole, Runner};
use super::tables::RaceTable;

fn non_empty(text: &str) -> Option<String> {
    let t = text.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Merge the results table into the runner set.
pub fn merge_results(table: &RaceTable, runners: &mut BTreeMap<u32, Runner>) {
    for row in &table.rows {
        let texts: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
        if texts.len() < 7 {
            continue;
        }

        // Rank: "1.", "2." ... or a letter marker ("D" disqualified,
        // "A" stopped). Non-numeric ranks are a valid absent place.
        let place = parse_integer(&texts[0].replace('.', "")).map(|p| p as u32);

        let Some(number) = texts.get(1).and_then(|t| parse_integer(t)).map(|n| n as u32) else {
            continue;
        };

        let time = texts.get(7).and_then(|t| parse_time_split(t));
        let final_odds = texts
            .get(8)
            .and_then(|t| parse_number(t))
            .filter(|v| *v > 1.0);

        match runners.get_mut(&number) {
            Some(runner) => {
                runner.finish_place = place;
                runner.finish_time = time;
                // Overlay only: a missing final price never clears the
                // entry-time one.
                if let Some(odds) = final_odds {
                    runner.current_odds = Some(odds);
                }
            }
            None => {
                // Finisher absent from the runners table: synthesize from
                // this row. No morning odds, earnings or form exist for it,
                // and the results table does not reveal the layout, so the
                // rider role defaults to driver.
                let mut runner = Runner::new(number, RiderRole::Driver);
                runner.horse_name = texts.get(2).cloned().unwrap_or_default();
                if let Some((sex, age)) = texts.get(3).and_then(|t| parse_sex_age(t)) {
                    runner.sex = Some(sex);
                    runner.age = Some(age);
                }
                runner.listed_distance =
                    texts.get(4).and_then(|t| parse_integer(t)).map(|d| d as u32);
                runner.rider = texts.get(5).and_then(|t| non_empty(t));
                runner.trainer = texts.get(6).and_then(|t| non_empty(t));
                runner.finish_place = place;
                runner.finish_time = time;
                runner.current_odds = final_odds;
                runners.insert(number, runner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::runners::extract_runners;

    fn table(rows: Vec<Vec<&str>>) -> RaceTable {
        RaceTable {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        }
    }

    fn base_runners() -> BTreeMap<u32, Runner> {
        let t = table(vec![
            vec!["N°", "Cheval", "SA", "Dist.", "Driver", "Entraîneur", "Musique", "Gains", "PMU", "Genybet"],
            vec!["1", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1a1a", "451 720", "1,8", "2,1"],
            vec!["2", "Hooker Berry", "H9", "2700", "F. Nivard", "J-M. Bazire", "2a4a", "398 540", "5,2", "4,9"],
        ]);
        extract_runners(&t)
    }

    #[test]
    fn test_overlay_place_time_odds() {
        let mut runners = base_runners();
        let results = table(vec![
            vec!["Rg.", "N°", "Chevaux", "SA", "Dist.", "Drivers", "Entraineurs", "Chronos", "Cotes"],
            vec!["1.", "1", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1'11''2", "1,6"],
        ]);
        merge_results(&results, &mut runners);

        let r = &runners[&1];
        assert_eq!(r.finish_place, Some(1));
        assert_eq!(r.finish_time.as_deref(), Some("1'11''2"));
        assert_eq!(r.current_odds, Some(1.6));
        // Entry-time fields untouched
        assert_eq!(r.morning_odds, Some(1.8));
        assert_eq!(r.earnings, Some(451720.0));
    }

    #[test]
    fn test_disqualified_rank_is_absent_place() {
        let mut runners = base_runners();
        let results = table(vec![
            vec!["D", "2", "Hooker Berry", "H9", "2700", "F. Nivard", "J-M. Bazire", "", ""],
        ]);
        merge_results(&results, &mut runners);
        let r = &runners[&2];
        assert_eq!(r.finish_place, None);
        assert_eq!(r.finish_time, None);
        // No odds cell: the entry-time price survives
        assert_eq!(r.current_odds, Some(4.9));
    }

    #[test]
    fn test_invalid_chrono_rejected() {
        let mut runners = base_runners();
        let results = table(vec![
            vec!["2.", "1", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1:11.2", "2,0"],
        ]);
        merge_results(&results, &mut runners);
        assert_eq!(runners[&1].finish_time, None);
        assert_eq!(runners[&1].finish_place, Some(2));
    }

    #[test]
    fn test_synthesized_finisher() {
        let mut runners = base_runners();
        let results = table(vec![
            vec!["3.", "9", "Jet Du Vivier", "H7", "2725", "G. Gelormini", "R. Donati", "1'12''4", "18"],
        ]);
        merge_results(&results, &mut runners);

        let r = &runners[&9];
        assert_eq!(r.horse_name, "Jet Du Vivier");
        assert_eq!(r.sex.as_deref(), Some("H"));
        assert_eq!(r.age, Some(7));
        assert_eq!(r.listed_distance, Some(2725));
        assert_eq!(r.rider.as_deref(), Some("G. Gelormini"));
        assert_eq!(r.trainer.as_deref(), Some("R. Donati"));
        assert_eq!(r.finish_place, Some(3));
        assert_eq!(r.finish_time.as_deref(), Some("1'12''4"));
        assert_eq!(r.current_odds, Some(18.0));
        assert_eq!(r.morning_odds, None);
        assert_eq!(r.earnings, None);
        assert_eq!(r.form, None);
        assert!(!r.non_starter);
    }

    #[test]
    fn test_short_rows_skipped() {
        let mut runners = base_runners();
        let results = table(vec![vec!["1.", "1", "Idao De Tillard"]]);
        merge_results(&results, &mut runners);
        assert_eq!(runners[&1].finish_place, None);
    }

    #[test]
    fn test_row_without_number_skipped() {
        let mut runners = base_runners();
        let results = table(vec![
            vec!["1.", "-", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1'11''2", "1,6"],
        ]);
        merge_results(&results, &mut runners);
        assert_eq!(runners[&1].finish_place, None);
        assert_eq!(runners.len(), 2);
    }
}
