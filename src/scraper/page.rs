//! One-shot lift of a fetched page into plain data.
//!
//! The browser hands back final HTML; everything the extraction core needs
//! (body text, main heading, tables as rows of cell text) is pulled out here
//! so the classifier, extractor and assembler stay pure and browser-free.

use scraper::{Html, Selector};

use super::tables::{extract_tables, RaceTable};

#[derive(Debug, Default)]
pub struct PageContent {
    /// Visible body text, element boundaries flattened to single spaces.
    pub body_text: String,
    /// First `<h1>` on the page, if any.
    pub heading: Option<String>,
    pub tables: Vec<RaceTable>,
}

impl PageContent {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let body_sel = Selector::parse("body").unwrap();
        let body_text = document
            .select(&body_sel)
            .next()
            .map(|body| {
                body.text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let h1_sel = Selector::parse("h1").unwrap();
        let heading = document.select(&h1_sel).next().map(|h| {
            h.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        });

        let tables = extract_tables(&document);

        Self {
            body_text,
            heading,
            tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_html() {
        let page = PageContent::from_html(
            r#"<html><body>
                 <h1>Prix De Grenade</h1>
                 <p>Départ à 13h50 - 2700 m - 85 000 euros</p>
                 <table><tr><td>1</td><td>Horse</td></tr></table>
               </body></html>"#,
        );
        assert_eq!(page.heading.as_deref(), Some("Prix De Grenade"));
        assert!(page.body_text.contains("13h50"));
        assert!(page.body_text.contains("2700 m"));
        assert_eq!(page.tables.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let page = PageContent::from_html("<html></html>");
        assert!(page.tables.is_empty());
        assert_eq!(page.heading, None);
    }
}
