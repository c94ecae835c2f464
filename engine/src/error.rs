//! @ai:module:intent Define error types for the TDI metric engine
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all engine operations
/// @ai:note numeric edge cases (zero races, zero-point seasons, tied groups) are never errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required column `{column}`{}", hint_suffix(.hint))]
    MissingColumn {
        column: String,
        hint: Option<String>,
    },

    #[error("Missing required table `{0}`")]
    MissingTable(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("CSV error at row {row}: {source}")]
    CsvRow {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent Whether this error reports absent input (table or column)
    /// @ai:effects pure
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Error::MissingColumn { .. } | Error::MissingTable(_))
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(" ({})", h)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
