use crate::error::{HoopError, Result};
use crate::services::extraction::{CandidateTable, TableHint};
use scraper::{Html, Selector};

pub(crate) mod espn_pages;
pub(crate) mod teamrankings;

pub use espn_pages::{GamelogPage, SplitsPage};
pub use teamrankings::{TeamStatsPage, TrendsPage};

/// Which extraction path a page's tables go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Hint-selected table(s), row classification, schema normalization.
    Rows,
    /// h2-titled stat sections flattened to (Category, Stat, Value) rows.
    StatSections,
}

/// One fetchable page that yields a single dataset for one entity.
/// How a page is obtained and which table/schema it maps to live here;
/// the extractor itself only ever sees text cells.
pub trait PageSource: Send + Sync {
    fn url(&self) -> String;
    fn hint(&self) -> TableHint;
    fn mode(&self) -> ExtractMode {
        ExtractMode::Rows
    }
    /// Key into the schema registry.
    fn schema_name(&self) -> &'static str;
    /// Dataset path, e.g. "utah-jazz" or "utah-jazz/lauri-markkanen".
    fn entity(&self) -> String;
    /// Dataset category, e.g. "gamelog"; usually the schema name.
    fn category(&self) -> &'static str {
        self.schema_name()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HoopError::Selector(e.to_string()))
}

/// Reduces a rendered document to its tables, in document order: element
/// class, the closest preceding h2 text, header cells (th), and body rows
/// of trimmed td text.
pub fn candidate_tables(document: &Html) -> Result<Vec<CandidateTable>> {
    let section_sel = parse_selector("h2, table")?;
    let tr_sel = parse_selector("tr")?;
    let th_sel = parse_selector("th")?;
    let td_sel = parse_selector("td")?;

    let mut tables = Vec::new();
    let mut title = String::new();
    for element in document.select(&section_sel) {
        if element.value().name() == "h2" {
            title = element.text().collect::<String>().trim().to_string();
            continue;
        }
        let table = element;
        let css_class = table.value().attr("class").unwrap_or_default().to_string();
        let mut header = Vec::new();
        let mut rows = Vec::new();

        for tr in table.select(&tr_sel) {
            let ths: Vec<String> = tr
                .select(&th_sel)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            if !ths.is_empty() && header.is_empty() {
                header = ths;
                continue;
            }

            let tds: Vec<String> = tr
                .select(&td_sel)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            if !tds.is_empty() {
                rows.push(tds);
            }
        }

        // A heading titles the single table that follows it; tables further
        // down (chrome, footers) must not inherit it.
        tables.push(CandidateTable {
            css_class,
            title: std::mem::take(&mut title),
            header,
            rows,
        });
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_reduced_in_document_order() {
        let html = r#"
            <html><body>
              <table class="nav"><tr><td>Home</td><td>Scores</td></tr></table>
              <h2> Overall Statistics </h2>
              <table class="tr-table datatable">
                <tr><th>Trend</th><th>Record</th></tr>
                <tr><td>All Games</td><td> 30-25-1 </td></tr>
                <tr><td>Home</td><td>17-10-0</td></tr>
              </table>
              <table class="footer">
                <tr><td>Home</td><td>Scores</td><td>Odds</td><td>Trends</td></tr>
              </table>
            </body></html>"#;
        let document = Html::parse_document(html);
        let tables = candidate_tables(&document).unwrap();

        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].css_class, "nav");
        assert_eq!(tables[0].title, "");
        assert_eq!(tables[1].css_class, "tr-table datatable");
        assert_eq!(tables[1].title, "Overall Statistics");
        assert_eq!(tables[1].header, vec!["Trend", "Record"]);
        assert_eq!(tables[1].rows.len(), 2);
        assert_eq!(tables[1].rows[0], vec!["All Games", "30-25-1"]);
        // The heading belongs to the table right after it and no other.
        assert_eq!(tables[2].title, "");
    }
}
