use rustc_hash::FxHashMap;

/// A secondary dataset keyed by entity key, read-only once loaded.
/// Rebuilt wholesale on refresh, never mutated in place during a run.
#[derive(Debug, Clone)]
pub struct LookupTable {
    name: String,
    rows: FxHashMap<String, FxHashMap<String, String>>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only used while building; tables are read-only once handed out.
    pub fn insert_field(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.rows
            .entry(key.into())
            .or_default()
            .insert(field.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn field(&self, key: &str, field: &str) -> Option<&str> {
        self.rows.get(key)?.get(field).map(String::as_str)
    }

    pub fn record(&self, key: &str) -> Option<&FxHashMap<String, String>> {
        self.rows.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.rows.keys()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_by_entity_key() {
        let mut table = LookupTable::new("team_stats");
        table.insert_field(
            "denver-nuggets",
            "Overall Statistics|Opp Points/Game",
            "109.2 (#6)",
        );

        assert!(table.contains("denver-nuggets"));
        assert_eq!(
            table.field("denver-nuggets", "Overall Statistics|Opp Points/Game"),
            Some("109.2 (#6)")
        );
        assert_eq!(table.field("denver-nuggets", "missing"), None);
        assert_eq!(table.field("boston-celtics", "anything"), None);
    }
}
