use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoopError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Selector error: {0}")]
    Selector(String),
    #[error("No table matched hint '{hint}' among {candidates} candidates")]
    TableNotFound { hint: String, candidates: usize },
    #[error("Table matched but no data rows survived classification: {0}")]
    EmptyResult(String),
    #[error("Lookup miss: key '{key}' not found in '{table}'")]
    LookupMiss { table: String, key: String },
    #[error("Cache rebuild failed for '{cache}': {reason}")]
    CacheRebuild { cache: String, reason: String },
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("{0}")]
    Other(String),
}

impl HoopError {
    /// Short tag used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HoopError::Network(_) => "network",
            HoopError::Io(_) => "io",
            HoopError::Serialization(_) => "serialization",
            HoopError::Csv(_) => "csv",
            HoopError::Selector(_) => "selector",
            HoopError::TableNotFound { .. } => "table_not_found",
            HoopError::EmptyResult(_) => "empty_result",
            HoopError::LookupMiss { .. } => "lookup_miss",
            HoopError::CacheRebuild { .. } => "cache_rebuild",
            HoopError::Timeout(_) => "timeout",
            HoopError::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, HoopError>;
