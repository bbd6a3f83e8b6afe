use crate::domain::row::NormalizedRow;
use crate::domain::schema::ExpectedSchema;
use crate::domain::storage::{CacheState, Storage};
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted record wrapping a cached payload with its build time.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    timestamp: i64,
    payload: serde_json::Value,
}

/// Datasets as CSV under `data_dir/<entity>/<stem>_<category>.csv`,
/// cache envelopes as JSON under `cache_dir/<source>.json`.
#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    fn dataset_path(&self, entity: &str, category: &str) -> PathBuf {
        let stem = entity.rsplit('/').next().unwrap_or(entity);
        self.data_dir
            .join(entity)
            .join(format!("{stem}_{category}.csv"))
    }

    fn cache_path(&self, source: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", source.replace('/', "_")))
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Storage for FileSystemStore {
    fn save_rows(
        &self,
        entity: &str,
        category: &str,
        schema: &ExpectedSchema,
        rows: &[NormalizedRow],
    ) -> Result<()> {
        let path = self.dataset_path(entity, category);
        Self::ensure_parent(&path)?;

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&schema.columns)?;
        for row in rows {
            writer.write_record(row.values())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn load_rows(
        &self,
        entity: &str,
        category: &str,
        schema: &ExpectedSchema,
    ) -> Result<Option<Vec<NormalizedRow>>> {
        let path = self.dataset_path(entity, category);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let values: Vec<String> = record.iter().map(str::to_string).collect();
            rows.push(NormalizedRow::from_values(values, schema));
        }
        Ok(Some(rows))
    }

    fn list_entities(&self, category: &str) -> Result<Vec<String>> {
        let suffix = format!("_{category}.csv");
        let mut entities = Vec::new();
        let mut pending = vec![self.data_dir.clone()];

        while let Some(dir) = pending.pop() {
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&suffix))
                {
                    if let Some(parent) = path.parent() {
                        if let Ok(entity) = parent.strip_prefix(&self.data_dir) {
                            entities.push(entity.to_string_lossy().replace('\\', "/"));
                        }
                    }
                }
            }
        }

        entities.sort();
        Ok(entities)
    }

    fn save_cache(&self, source: &str, payload: &serde_json::Value) -> Result<()> {
        let path = self.cache_path(source);
        Self::ensure_parent(&path)?;
        let envelope = CacheEnvelope {
            timestamp: Utc::now().timestamp(),
            payload: payload.clone(),
        };
        fs::write(&path, serde_json::to_string_pretty(&envelope)?)?;
        Ok(())
    }

    fn load_cache(&self, source: &str, window: Duration) -> Result<CacheState> {
        let path = self.cache_path(source);
        if !path.exists() {
            return Ok(CacheState::Missing);
        }

        let envelope: CacheEnvelope = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let age = Utc::now().timestamp() - envelope.timestamp;
        if age >= 0 && (age as u64) < window.as_secs() {
            Ok(CacheState::Fresh(envelope.payload))
        } else {
            Ok(CacheState::Stale(envelope.payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::registry;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, FileSystemStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(dir.path().join("data"), dir.path().join("cache"));
        (dir, store)
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dataset_roundtrip_preserves_rows() {
        let (_dir, store) = store();
        let schema = registry().get("roster").unwrap();
        let rows = vec![
            NormalizedRow::from_raw(&strings(&["Jayson Tatum", "4065648"]), schema),
            NormalizedRow::from_raw(&strings(&["Jaylen Brown", "3917376"]), schema),
        ];

        store.save_rows("boston-celtics", "roster", schema, &rows).unwrap();
        let loaded = store
            .load_rows("boston-celtics", "roster", schema)
            .unwrap()
            .unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn missing_dataset_is_none() {
        let (_dir, store) = store();
        let schema = registry().get("roster").unwrap();
        assert!(store.load_rows("nobody", "roster", schema).unwrap().is_none());
    }

    #[test]
    fn nested_entities_are_listed() {
        let (_dir, store) = store();
        let schema = registry().get("gamelog").unwrap();
        let row = NormalizedRow::from_raw(&strings(&["Mon 11/4", "DEN"]), schema);

        store
            .save_rows("boston-celtics/jayson-tatum", "gamelog", schema, &[row.clone()])
            .unwrap();
        store
            .save_rows("utah-jazz/lauri-markkanen", "gamelog", schema, &[row])
            .unwrap();

        let entities = store.list_entities("gamelog").unwrap();
        assert_eq!(
            entities,
            vec!["boston-celtics/jayson-tatum", "utah-jazz/lauri-markkanen"]
        );
    }

    #[test]
    fn fresh_cache_is_returned_without_rebuild() {
        let (_dir, store) = store();
        let payload = json!({"luka-doncic": "los-angeles-lakers"});
        store.save_cache("trade_feed", &payload).unwrap();

        match store
            .load_cache("trade_feed", Duration::from_secs(60 * 60))
            .unwrap()
        {
            CacheState::Fresh(value) => assert_eq!(value, payload),
            other => panic!("expected fresh cache, got {other:?}"),
        }
    }

    #[test]
    fn zero_window_makes_cache_stale() {
        let (_dir, store) = store();
        store.save_cache("trade_feed", &json!({})).unwrap();
        assert!(matches!(
            store.load_cache("trade_feed", Duration::ZERO).unwrap(),
            CacheState::Stale(_)
        ));
    }

    #[test]
    fn absent_cache_is_missing() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load_cache("nothing", Duration::from_secs(60)).unwrap(),
            CacheState::Missing
        ));
    }
}
