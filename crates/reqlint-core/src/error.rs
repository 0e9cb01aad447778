use reqlint_deps::ParseError;
use thiserror::Error;

/// Everything that can go wrong between reading a manifest and writing a report
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
