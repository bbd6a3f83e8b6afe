use crate::domain::schema::ExpectedSchema;
use serde::{Deserialize, Serialize};

/// Ordered cell text as scraped from one table row. Length varies by page.
pub type RawRow = Vec<String>;

/// A row shaped to an [`ExpectedSchema`]: one trimmed value per column,
/// sentinel-filled where the source row was short. The length always
/// equals the schema length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    values: Vec<String>,
}

impl NormalizedRow {
    /// Trim every cell, pad short rows with the schema sentinel, and
    /// truncate long rows keeping the leading (identifying) columns.
    pub fn from_raw(raw: &[String], schema: &ExpectedSchema) -> Self {
        let mut values: Vec<String> = raw
            .iter()
            .take(schema.len())
            .map(|cell| cell.trim().to_string())
            .collect();
        while values.len() < schema.len() {
            values.push(schema.sentinel.clone());
        }
        Self { values }
    }

    /// Wrap values already shaped to the schema (e.g. read back from CSV).
    /// Still enforces the length invariant.
    pub fn from_values(values: Vec<String>, schema: &ExpectedSchema) -> Self {
        Self::from_raw(&values, schema)
    }

    pub fn get<'a>(&'a self, schema: &ExpectedSchema, column: &str) -> Option<&'a str> {
        let idx = schema.column_index(column)?;
        self.values.get(idx).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::registry;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_row_is_padded_to_schema_length() {
        let schema = registry().get("gamelog").unwrap();
        let row = NormalizedRow::from_raw(&strings(&["Mon 11/4", "DEN"]), schema);
        assert_eq!(row.len(), schema.len());
        assert_eq!(row.get(schema, "RESULT"), Some("N/A"));
        assert_eq!(row.get(schema, "PTS"), Some("N/A"));
    }

    #[test]
    fn long_row_keeps_leading_columns() {
        let schema = registry().get("stats").unwrap();
        let raw = strings(&["Overall Statistics", "Points/Game", "118.9 (#2)", "extra", "junk"]);
        let row = NormalizedRow::from_raw(&raw, schema);
        assert_eq!(row.len(), 3);
        assert_eq!(row.get(schema, "Category"), Some("Overall Statistics"));
        assert_eq!(row.get(schema, "Value (rank)"), Some("118.9 (#2)"));
    }

    #[test]
    fn cells_are_trimmed() {
        let schema = registry().get("roster").unwrap();
        let row = NormalizedRow::from_raw(&strings(&["  Jaylen Brown ", " 3917376 "]), schema);
        assert_eq!(row.get(schema, "Player Name"), Some("Jaylen Brown"));
        assert_eq!(row.get(schema, "Player ID"), Some("3917376"));
    }
}
