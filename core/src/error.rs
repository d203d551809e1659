use std::path::PathBuf;
use thiserror::Error;

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Failures at the edges of the parser: decoding raw history and loading config.
///
/// Folding itself never fails.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to decode run history: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid parser config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
