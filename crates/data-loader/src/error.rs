//! Error types for the data-loader crate.
//!
//! Two families live here:
//! - `DataLoadError` for reading and validating the data files
//! - `StoreError` for the collaborator contracts (`Catalog`, `HistoryStore`)

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected at least {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Referenced entity doesn't exist (e.g., watched entry for a non-existent movie)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// The same record appears twice where only one is allowed
    #[error("Duplicate {entity} with id {id}")]
    Duplicate { entity: String, id: u32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Errors reported by a catalog or history store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested record does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: u32 },

    /// The store could not serve the request at all
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &str, id: u32) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
