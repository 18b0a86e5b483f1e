//! Table extraction and classification for race pages.
//!
//! A geny race page carries several tables: a calendar widget, the runners
//! ("partants") table, and, once the race has run, a results table. The
//! layouts vary by discipline, so classification goes through header-keyword
//! rules rather than CSS classes.

use scraper::{Html, Selector};

/// A table lifted out of the page as rows of raw cell text.
#[derive(Debug, Clone, Default)]
pub struct RaceTable {
    pub rows: Vec<Vec<String>>,
}

/// How the runners table was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnersPick {
    /// Header keywords matched; index into the page's table list.
    Classified(usize),
    /// Nothing matched but the page has at least two tables: the second one
    /// is used (the first is conventionally the calendar widget). Degraded
    /// mode, callers must log it.
    Fallback(usize),
    NotFound,
}

#[derive(Debug)]
pub struct TableClassification {
    pub runners: RunnersPick,
    pub results: Option<usize>,
}

/// Lift every `<table>` into rows of cell text.
///
/// Both `th` and `td` cells are kept: geny sometimes renders headers as data
/// cells, and the data-row guards downstream reject header rows anyway.
/// Element boundaries inside a cell become double spaces, matching how the
/// rendered page separates a name from its trailing annotations.
pub fn extract_tables(document: &Html) -> Vec<RaceTable> {
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();

    let mut tables = Vec::new();
    for table in document.select(&table_sel) {
        let mut rows = Vec::new();
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|cell| {
                    cell.text()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join("  ")
                })
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        tables.push(RaceTable { rows });
    }
    tables
}

/// Concatenate the first two rows into one lower-cased header string.
/// Two rows because geny splits some headers across a pair of `<tr>`s.
fn header_text(table: &RaceTable) -> String {
    let mut parts = Vec::new();
    for row in table.rows.iter().take(2) {
        for cell in row {
            let collapsed = cell.split_whitespace().collect::<Vec<_>>().join(" ");
            parts.push(collapsed.to_lowercase());
        }
    }
    parts.join(" ")
}

fn is_results_header(header: &str) -> bool {
    header.contains("chrono") && (header.contains("rg") || header.contains("rang"))
}

fn is_runners_header(header: &str) -> bool {
    (header.contains("driver") || header.contains("jockey"))
        && (header.contains("cheval") || header.contains("n°") || header.contains("n "))
}

/// Identify the runners table and, if present, the results table.
///
/// Ranked rules, one claim per table. The results predicate runs first: the
/// results header also names drivers and horses, so testing runners first
/// would steal it whenever the results table precedes the runners table in
/// the DOM.
pub fn classify_tables(tables: &[RaceTable]) -> TableClassification {
    let mut runners = RunnersPick::NotFound;
    let mut results = None;

    for (i, table) in tables.iter().enumerate() {
        let header = header_text(table);
        if results.is_none() && is_results_header(&header) {
            results = Some(i);
        } else if runners == RunnersPick::NotFound && is_runners_header(&header) {
            runners = RunnersPick::Classified(i);
        }
    }

    if runners == RunnersPick::NotFound && tables.len() > 1 {
        let fallback = if results == Some(1) { RunnersPick::NotFound } else { RunnersPick::Fallback(1) };
        runners = fallback;
    }

    TableClassification { runners, results }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> RaceTable {
        RaceTable {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        }
    }

    fn runners_table() -> RaceTable {
        table(vec![
            vec!["N°", "Cheval", "SA", "Dist.", "Driver", "Entraîneur", "Musique", "Gains"],
            vec!["1", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1a1a", "451 720"],
        ])
    }

    fn results_table() -> RaceTable {
        table(vec![
            vec!["Rg.", "N°", "Chevaux", "SA", "Dist.", "Drivers", "Entraineurs", "Chronos", "Cotes"],
            vec!["1.", "4", "Idao De Tillard", "H8", "2700", "C. Nivard", "T. Duvaldestin", "1'11''2", "1.8"],
        ])
    }

    fn calendar_table() -> RaceTable {
        table(vec![vec!["Lu", "Ma", "Me", "Je", "Ve", "Sa", "Di"]])
    }

    #[test]
    fn test_classify_both_tables() {
        let tables = vec![calendar_table(), runners_table(), results_table()];
        let c = classify_tables(&tables);
        assert_eq!(c.runners, RunnersPick::Classified(1));
        assert_eq!(c.results, Some(2));
    }

    #[test]
    fn test_classify_reversed_order() {
        // The results header also mentions drivers and horses; it must still
        // be claimed as results even when it comes first on the page.
        let tables = vec![calendar_table(), results_table(), runners_table()];
        let c = classify_tables(&tables);
        assert_eq!(c.runners, RunnersPick::Classified(2));
        assert_eq!(c.results, Some(1));
    }

    #[test]
    fn test_classify_jockey_header() {
        let t = table(vec![vec!["N°", "Cheval", "SA", "Dist.", "Poids", "Jockey", "Entraîneur"]]);
        let c = classify_tables(&[calendar_table(), t]);
        assert_eq!(c.runners, RunnersPick::Classified(1));
        assert_eq!(c.results, None);
    }

    #[test]
    fn test_fallback_second_table() {
        let anonymous = table(vec![vec!["1", "Some Horse", "F6", "2850"]]);
        let tables = vec![calendar_table(), anonymous];
        let c = classify_tables(&tables);
        assert_eq!(c.runners, RunnersPick::Fallback(1));
        assert_eq!(c.results, None);
    }

    #[test]
    fn test_single_table_not_found() {
        let c = classify_tables(&[calendar_table()]);
        assert_eq!(c.runners, RunnersPick::NotFound);
        assert_eq!(c.results, None);
    }

    #[test]
    fn test_results_table_never_doubles_as_runners_fallback() {
        let tables = vec![calendar_table(), results_table()];
        let c = classify_tables(&tables);
        assert_eq!(c.results, Some(1));
        assert_eq!(c.runners, RunnersPick::NotFound);
    }

    #[test]
    fn test_extract_tables_from_html() {
        let html = Html::parse_document(
            r#"<table>
                 <tr><th>N°</th><th>Cheval</th><th>Driver</th></tr>
                 <tr><td>1</td><td><a>Idao De Tillard</a><span>(supp.)</span></td><td>C. Nivard</td></tr>
               </table>"#,
        );
        let tables = extract_tables(&html);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0][0], "N°");
        // Element boundaries become double spaces
        assert_eq!(tables[0].rows[1][1], "Idao De Tillard  (supp.)");
    }
}
