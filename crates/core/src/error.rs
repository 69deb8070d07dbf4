use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

/// Failures at the loading boundary. The aggregation and scoring engine
/// itself never fails on data quality; it degrades to zero or N/A instead.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for InsightError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
