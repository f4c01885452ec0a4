// src/error.rs
use thiserror::Error;

/// Errors that abort a whole operation. Per-source failures never end up
/// here; they are folded into a `FetchOutcome` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("source registered twice: {0}")]
    DuplicateSource(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
