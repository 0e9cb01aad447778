// Configuration, reporting and export on top of reqlint-deps
pub mod config;
pub mod error;
pub mod export;
pub mod manifest_file;
pub mod report;

pub use config::Config;
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use manifest_file::{read_manifest, write_manifest};
pub use report::Report;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
