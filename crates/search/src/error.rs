//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised while loading a reference table.
///
/// Ranking itself never fails.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Table JSON could not be parsed
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two records share an id
    #[error("Duplicate record id: {0}")]
    DuplicateId(String),

    /// A record has a blank code
    #[error("Record {0} has an empty code")]
    EmptyCode(String),
}

/// Error code for integration with survey-core error handling.
/// Range: 11xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCode {
    /// JSON parsing error
    JsonParsing = 11001,
    /// Duplicate record id
    DuplicateId = 11002,
    /// Empty record code
    EmptyCode = 11003,
}

impl SearchError {
    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::Json(_) => SearchErrorCode::JsonParsing,
            SearchError::DuplicateId(_) => SearchErrorCode::DuplicateId,
            SearchError::EmptyCode(_) => SearchErrorCode::EmptyCode,
        }
    }
}
