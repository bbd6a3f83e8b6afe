use crate::domain::row::{NormalizedRow, RawRow};
use crate::domain::schema::{ExpectedSchema, LeadingToken};
use crate::error::{HoopError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// One table found on a page, already reduced to text: the element class,
/// the nearest preceding section heading, the header row (th cells), and
/// the body rows in document order.
#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    pub css_class: String,
    /// Text of the closest h2 before the table, empty when there is none.
    /// The teamrankings stats page titles each stat section this way.
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// How to pick the right table among several on a page.
#[derive(Debug, Clone)]
pub enum TableHint {
    /// Any cell or header contains this substring.
    TextContains(String),
    /// The header row contains this column label.
    HeaderContains(String),
    /// The table element's class attribute contains this substring
    /// (teamrankings tables carry a "tr-table" class).
    ClassContains(String),
    /// Concatenate every candidate's rows in document order. ESPN splits and
    /// game-log pages spread labels and stats across sibling tables.
    Union,
}

impl TableHint {
    fn describe(&self) -> String {
        match self {
            TableHint::TextContains(s) => format!("text~{s}"),
            TableHint::HeaderContains(s) => format!("header~{s}"),
            TableHint::ClassContains(s) => format!("class~{s}"),
            TableHint::Union => "union".to_string(),
        }
    }

    fn matches(&self, table: &CandidateTable) -> bool {
        match self {
            TableHint::TextContains(s) => {
                table.header.iter().any(|c| c.contains(s.as_str()))
                    || table
                        .rows
                        .iter()
                        .any(|row| row.iter().any(|c| c.contains(s.as_str())))
            }
            TableHint::HeaderContains(s) => table.header.iter().any(|c| c.contains(s.as_str())),
            TableHint::ClassContains(s) => table.css_class.contains(s.as_str()),
            TableHint::Union => true,
        }
    }
}

enum RowKind<'a> {
    /// Exactly one non-empty cell matching a known category label; kept as
    /// context for subsequent data rows, never emitted itself.
    SectionMarker(&'a str),
    Data(Vec<String>),
    Skip,
}

static WEEKDAY_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Mon|Tue|Wed|Thu|Fri|Sat|Sun)\s+\d{1,2}/\d{1,2}").unwrap());

pub struct TableExtractor;

impl TableExtractor {
    /// Turns candidate tables into normalized rows per the schema.
    ///
    /// Selection: first candidate matching the hint, in document order; a
    /// lone unmatched candidate is used anyway; several unmatched candidates
    /// are ambiguous and fail with `TableNotFound`.
    pub fn extract(
        tables: &[CandidateTable],
        hint: &TableHint,
        schema: &ExpectedSchema,
    ) -> Result<Vec<NormalizedRow>> {
        let selected = Self::select(tables, hint)?;

        let mut markers: Vec<&str> = Vec::new();
        let mut data_rows: Vec<Vec<String>> = Vec::new();

        for table in &selected {
            for row in &table.rows {
                match Self::classify(row, schema) {
                    RowKind::SectionMarker(label) => markers.push(label),
                    RowKind::Data(cells) => data_rows.push(cells),
                    RowKind::Skip => debug!(schema = %schema.name, "skipping subheader row"),
                }
            }
        }

        if markers.is_empty() && data_rows.is_empty() {
            return Err(HoopError::EmptyResult(schema.name.clone()));
        }

        if schema.has_categories() {
            Ok(Self::fill_categories(schema, &markers, data_rows))
        } else {
            Ok(data_rows
                .iter()
                .map(|cells| NormalizedRow::from_raw(cells, schema))
                .collect())
        }
    }

    fn select<'a>(
        tables: &'a [CandidateTable],
        hint: &TableHint,
    ) -> Result<Vec<&'a CandidateTable>> {
        if let TableHint::Union = hint {
            if tables.is_empty() {
                return Err(HoopError::TableNotFound {
                    hint: hint.describe(),
                    candidates: 0,
                });
            }
            return Ok(tables.iter().collect());
        }

        if let Some(table) = tables.iter().find(|t| hint.matches(t)) {
            return Ok(vec![table]);
        }

        // A single unmatched candidate is unambiguous.
        if tables.len() == 1 {
            return Ok(vec![&tables[0]]);
        }

        Err(HoopError::TableNotFound {
            hint: hint.describe(),
            candidates: tables.len(),
        })
    }

    fn classify<'a>(row: &'a [String], schema: &'a ExpectedSchema) -> RowKind<'a> {
        let non_empty: Vec<&str> = row
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if non_empty.is_empty() {
            return RowKind::Skip;
        }

        if non_empty.len() == 1 {
            if let Some(label) = schema
                .categories
                .iter()
                .find(|cat| cat.as_str() == non_empty[0])
            {
                return RowKind::SectionMarker(label);
            }
            return RowKind::Skip;
        }

        let first = non_empty[0];
        let is_data = match schema.leading_token {
            LeadingToken::Numeric => first.chars().all(|c| c.is_ascii_digit()),
            LeadingToken::WeekdayDate => WEEKDAY_DATE.is_match(first),
            LeadingToken::AnyText => true,
        };

        if is_data {
            RowKind::Data(non_empty.iter().map(|c| c.to_string()).collect())
        } else {
            RowKind::Skip
        }
    }

    /// Flattens h2-titled stat sections into `(Category, Stat, Value)` rows.
    /// Source rows pair an offense and a defense stat in four cells:
    /// `Stat, Value, Opp Stat, Opp Value`; each yields two output rows under
    /// the section title. Untitled tables are navigation chrome and skipped,
    /// as are titles outside the schema's known section labels.
    pub fn extract_sections(
        tables: &[CandidateTable],
        schema: &ExpectedSchema,
    ) -> Result<Vec<NormalizedRow>> {
        let mut out = Vec::new();

        for table in tables {
            if table.title.is_empty() {
                continue;
            }
            if schema.has_categories() && !schema.categories.contains(&table.title) {
                debug!(schema = %schema.name, title = %table.title, "skipping unknown section");
                continue;
            }
            for row in &table.rows {
                if row.len() < 4 {
                    continue;
                }
                let stat = row[0].trim();
                if stat.is_empty() {
                    continue;
                }
                let opp_stat = if row[2].trim().is_empty() {
                    format!("Opp {stat}")
                } else {
                    row[2].trim().to_string()
                };

                let offense = vec![table.title.clone(), stat.to_string(), row[1].clone()];
                let defense = vec![table.title.clone(), opp_stat, row[3].clone()];
                out.push(NormalizedRow::from_raw(&offense, schema));
                out.push(NormalizedRow::from_raw(&defense, schema));
            }
        }

        if out.is_empty() {
            return Err(HoopError::EmptyResult(schema.name.clone()));
        }
        Ok(out)
    }

    /// Pairs section markers with data rows by position (the page interleaves
    /// them), then emits exactly one row per declared category, in declared
    /// order, defaults-filled where the page had nothing.
    fn fill_categories(
        schema: &ExpectedSchema,
        markers: &[&str],
        data_rows: Vec<Vec<String>>,
    ) -> Vec<NormalizedRow> {
        let defaults = schema.default_stats();
        let stat_width = schema.len() - 1;

        let mut by_category: rustc_hash::FxHashMap<&str, Vec<String>> =
            rustc_hash::FxHashMap::default();
        for (marker, stats) in markers.iter().zip(data_rows.into_iter()) {
            by_category.insert(marker, stats);
        }

        schema
            .categories
            .iter()
            .map(|category| {
                let stats = by_category
                    .get(category.as_str())
                    .map(|s| s.iter().take(stat_width).cloned().collect::<Vec<_>>())
                    .unwrap_or_else(|| defaults.clone());

                let mut cells = Vec::with_capacity(schema.len());
                cells.push(category.clone());
                cells.extend(stats);
                NormalizedRow::from_raw(&cells, schema)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{registry, LeadingToken};
    use crate::services::normalize::parse_stat_number;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn gamelog_table(rows: Vec<Vec<String>>) -> CandidateTable {
        CandidateTable {
            css_class: "Table".to_string(),
            title: String::new(),
            header: strings(&["DATE", "OPP", "RESULT", "MIN", "PTS"]),
            rows,
        }
    }

    fn mini_gamelog_schema() -> ExpectedSchema {
        ExpectedSchema {
            name: "gamelog".to_string(),
            version: 1,
            columns: strings(&["DATE", "OPP", "RESULT", "MIN", "PTS"]),
            sentinel: "N/A".to_string(),
            leading_token: LeadingToken::WeekdayDate,
            categories: Vec::new(),
            category_defaults: Vec::new(),
        }
    }

    #[test]
    fn gamelog_row_extracts_all_fields() {
        // End-to-end scenario: one weekday-dated row, five columns.
        let schema = mini_gamelog_schema();
        let table = gamelog_table(vec![strings(&[
            "Mon 11/4", "DEN", "W 120-110", "34", "PTS: 28",
        ])]);

        let rows =
            TableExtractor::extract(&[table], &TableHint::HeaderContains("DATE".into()), &schema)
                .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), schema.len());
        assert_eq!(rows[0].get(&schema, "OPP"), Some("DEN"));
        let pts = rows[0].get(&schema, "PTS").unwrap();
        assert_eq!(parse_stat_number(pts), Some(28.0));
    }

    #[test]
    fn normalized_length_matches_schema_for_ragged_rows() {
        let schema = mini_gamelog_schema();
        let table = gamelog_table(vec![
            strings(&["Mon 11/4", "DEN"]),
            strings(&["Wed 11/6", "@BOS", "L 99-101", "31", "PTS: 17", "extra", "cells"]),
        ]);

        let rows = TableExtractor::extract(&[table], &TableHint::Union, &schema).unwrap();
        for row in &rows {
            assert_eq!(row.len(), schema.len());
        }
        assert_eq!(rows[0].get(&schema, "PTS"), Some("N/A"));
        assert_eq!(rows[1].get(&schema, "PTS"), Some("PTS: 17"));
    }

    #[test]
    fn ambiguous_candidates_without_match_fail() {
        let schema = mini_gamelog_schema();
        let tables = vec![
            CandidateTable {
                css_class: "nav".to_string(),
                title: String::new(),
                header: strings(&["Links"]),
                rows: vec![strings(&["Home", "Scores"])],
            },
            CandidateTable {
                css_class: "standings".to_string(),
                title: String::new(),
                header: strings(&["Team", "W", "L"]),
                rows: vec![strings(&["Celtics", "50", "12"])],
            },
        ];

        let err = TableExtractor::extract(
            &tables,
            &TableHint::HeaderContains("DATE".into()),
            &schema,
        )
        .unwrap_err();
        assert!(matches!(err, HoopError::TableNotFound { candidates: 2, .. }));
    }

    #[test]
    fn text_hint_matches_on_any_cell() {
        let schema = mini_gamelog_schema();
        let tables = vec![
            CandidateTable {
                css_class: "nav".to_string(),
                title: String::new(),
                header: strings(&["Links"]),
                rows: vec![strings(&["Home", "Scores"])],
            },
            gamelog_table(vec![strings(&["Sat 12/7", "@GSW", "W 115-109", "36", "25"])]),
        ];

        let rows =
            TableExtractor::extract(&tables, &TableHint::TextContains("@GSW".into()), &schema)
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(&schema, "OPP"), Some("@GSW"));
    }

    #[test]
    fn single_unmatched_candidate_is_used() {
        let schema = mini_gamelog_schema();
        let table = gamelog_table(vec![strings(&["Fri 1/3", "vsUTA", "W 130-110", "29", "22"])]);
        let rows = TableExtractor::extract(
            &[table],
            &TableHint::ClassContains("does-not-exist".into()),
            &schema,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn class_hint_picks_matching_table_in_document_order() {
        let schema = registry().get("over-under-trends").unwrap();
        let tables = vec![
            CandidateTable {
                css_class: "sidebar".to_string(),
                title: String::new(),
                header: strings(&["Other"]),
                rows: vec![strings(&["noise", "noise"])],
            },
            CandidateTable {
                css_class: "tr-table datatable".to_string(),
                title: String::new(),
                header: strings(&["Trend", "Over/Under Record", "Over/Under %", "MOV", "Over/Under +/-"]),
                rows: vec![strings(&["All Games", "30-25-1", "54.5%", "+2.1", "-1.3"])],
            },
        ];

        let rows =
            TableExtractor::extract(&tables, &TableHint::ClassContains("tr-table".into()), schema)
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(schema, "Trend"), Some("All Games"));
    }

    #[test]
    fn preset_categories_emitted_exactly_once_in_declared_order() {
        let schema = ExpectedSchema {
            name: "splits".to_string(),
            version: 1,
            columns: strings(&["SPLIT", "GP", "PTS"]),
            sentinel: "N/A".to_string(),
            leading_token: LeadingToken::Numeric,
            categories: strings(&["Home", "Road", "All Splits"]),
            category_defaults: strings(&["0", "0.0"]),
        };
        // Page provides only a Home marker and its stats row.
        let table = CandidateTable {
            css_class: String::new(),
            title: String::new(),
            header: Vec::new(),
            rows: vec![
                strings(&["Home", "", ""]),
                strings(&["20", "25.4"]),
            ],
        };

        let rows = TableExtractor::extract(&[table], &TableHint::Union, &schema).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(&schema, "SPLIT"), Some("Home"));
        assert_eq!(rows[0].get(&schema, "GP"), Some("20"));
        assert_eq!(rows[1].get(&schema, "SPLIT"), Some("Road"));
        assert_eq!(rows[1].get(&schema, "GP"), Some("0"));
        assert_eq!(rows[1].get(&schema, "PTS"), Some("0.0"));
        assert_eq!(rows[2].get(&schema, "SPLIT"), Some("All Splits"));
        assert_eq!(rows[2].get(&schema, "PTS"), Some("0.0"));
    }

    #[test]
    fn subheaders_are_skipped() {
        let schema = ExpectedSchema {
            name: "splits".to_string(),
            version: 1,
            columns: strings(&["SPLIT", "GP", "PTS"]),
            sentinel: "N/A".to_string(),
            leading_token: LeadingToken::Numeric,
            categories: strings(&["Home"]),
            category_defaults: strings(&["0", "0.0"]),
        };
        let table = CandidateTable {
            css_class: String::new(),
            title: String::new(),
            header: Vec::new(),
            rows: vec![
                strings(&["GP", "PTS"]), // repeated subheader, non-numeric lead
                strings(&["Home"]),
                strings(&["41", "27.1"]),
            ],
        };

        let rows = TableExtractor::extract(&[table], &TableHint::Union, &schema).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(&schema, "GP"), Some("41"));
    }

    #[test]
    fn titled_sections_flatten_to_category_stat_value_rows() {
        let schema = registry().get("stats").unwrap();
        let tables = vec![
            CandidateTable {
                css_class: "nav".to_string(),
                title: String::new(),
                header: Vec::new(),
                rows: vec![strings(&["Home", "Scores", "Odds", "More"])],
            },
            CandidateTable {
                css_class: "tr-table".to_string(),
                title: "Overall Statistics".to_string(),
                header: strings(&["", "Offense", "", "Defense"]),
                rows: vec![strings(&[
                    "Points/Game",
                    "118.9 (#2)",
                    "Opp Points/Game",
                    "109.2 (#6)",
                ])],
            },
        ];

        let rows = TableExtractor::extract_sections(&tables, schema).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(schema, "Category"), Some("Overall Statistics"));
        assert_eq!(rows[0].get(schema, "Stat"), Some("Points/Game"));
        assert_eq!(rows[0].get(schema, "Value (rank)"), Some("118.9 (#2)"));
        assert_eq!(rows[1].get(schema, "Stat"), Some("Opp Points/Game"));
        assert_eq!(rows[1].get(schema, "Value (rank)"), Some("109.2 (#6)"));
    }

    #[test]
    fn chrome_tables_with_unknown_titles_are_not_published_as_stats() {
        let schema = registry().get("stats").unwrap();
        let tables = vec![
            CandidateTable {
                css_class: "tr-table".to_string(),
                title: "Overall Statistics".to_string(),
                header: Vec::new(),
                rows: vec![strings(&[
                    "Points/Game",
                    "118.9 (#2)",
                    "Opp Points/Game",
                    "109.2 (#6)",
                ])],
            },
            CandidateTable {
                css_class: "footer".to_string(),
                title: "Latest Odds".to_string(),
                header: Vec::new(),
                rows: vec![strings(&["Home", "Scores", "Odds", "Trends"])],
            },
        ];

        let rows = TableExtractor::extract_sections(&tables, schema).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|r| r.get(schema, "Category") == Some("Overall Statistics")));
    }

    #[test]
    fn blank_defense_stat_name_gets_opp_prefix() {
        let schema = registry().get("stats").unwrap();
        let table = CandidateTable {
            css_class: String::new(),
            title: "Blocks Statistics".to_string(),
            header: Vec::new(),
            rows: vec![strings(&["Blocks/Game", "5.9 (#4)", "", "4.1 (#12)"])],
        };

        let rows = TableExtractor::extract_sections(&[table], schema).unwrap();
        assert_eq!(rows[1].get(schema, "Stat"), Some("Opp Blocks/Game"));
    }

    #[test]
    fn all_rows_classified_away_is_empty_result() {
        let schema = mini_gamelog_schema();
        let table = gamelog_table(vec![strings(&["Totals", "", "", "", ""])]);
        let err = TableExtractor::extract(&[table], &TableHint::Union, &schema).unwrap_err();
        assert!(matches!(err, HoopError::EmptyResult(_)));
    }
}
