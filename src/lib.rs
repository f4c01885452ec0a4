// src/lib.rs
// Public library surface for the service binary, demos and integration tests.

pub mod api;
pub mod error;
pub mod metrics;
pub mod search;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::{SearchError, SearchResult};
pub use crate::search::{
    AggregationEngine, AggregationResult, EngineBuilder, EngineSettings, FailureReason,
    FetchOutcome, OutcomeStatus, Posting, Query, RawRecord, SourceAdapter, SourceError,
    SourceReport,
};

use crate::search::config::SearchConfig;
use crate::search::providers::builtin_adapters;

/// Build an engine from config (file/env lookup) with the built-in adapters.
pub fn engine_from_config(cfg: &SearchConfig) -> SearchResult<AggregationEngine> {
    AggregationEngine::builder()
        .settings(EngineSettings::from(cfg))
        .adapters(builtin_adapters(cfg))
        .build()
}
