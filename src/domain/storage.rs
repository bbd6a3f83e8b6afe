use crate::domain::row::NormalizedRow;
use crate::domain::schema::ExpectedSchema;
use crate::error::Result;
use std::time::Duration;

/// Outcome of a cache probe against the freshness window.
#[derive(Debug)]
pub enum CacheState {
    Fresh(serde_json::Value),
    /// Envelope exists but its timestamp is outside the window. The payload
    /// is still returned so a failed rebuild can fall back to it.
    Stale(serde_json::Value),
    Missing,
}

/// Seam between the services and the filesystem. One dataset per
/// (entity, stat-category) pair; entities may be nested paths like
/// "boston-celtics/jayson-tatum".
pub trait Storage: Send + Sync {
    fn save_rows(
        &self,
        entity: &str,
        category: &str,
        schema: &ExpectedSchema,
        rows: &[NormalizedRow],
    ) -> Result<()>;

    fn load_rows(
        &self,
        entity: &str,
        category: &str,
        schema: &ExpectedSchema,
    ) -> Result<Option<Vec<NormalizedRow>>>;

    /// Entities that have a persisted dataset for `category`.
    fn list_entities(&self, category: &str) -> Result<Vec<String>>;

    /// Persist a `{timestamp, payload}` envelope for `source`, stamping it now.
    fn save_cache(&self, source: &str, payload: &serde_json::Value) -> Result<()>;

    fn load_cache(&self, source: &str, window: Duration) -> Result<CacheState>;
}
