// src/search/mod.rs
pub mod config;
pub mod dedup;
pub mod engine;
pub mod fanout;
pub mod normalize;
pub mod providers;
pub mod render;
pub mod types;
pub mod watch;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub use engine::{AggregationEngine, EngineBuilder, EngineSettings};
pub use types::{
    AggregationResult, FailureReason, FetchOutcome, OutcomeStatus, Posting, Query, RawRecord,
    SourceAdapter, SourceError, SourceReport,
};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("search_requests_total", "Search calls received.");
        describe_counter!(
            "search_invalid_queries_total",
            "Searches rejected before any source was called."
        );
        describe_counter!(
            "search_source_failures_total",
            "Per-source fetch failures by reason."
        );
        describe_counter!(
            "search_records_fetched_total",
            "Raw records accepted from sources."
        );
        describe_counter!(
            "search_records_dropped_total",
            "Raw records dropped during normalization."
        );
        describe_counter!("search_dedup_total", "Postings removed as duplicates.");
        describe_histogram!(
            "search_source_fetch_ms",
            "Per-source fetch time in milliseconds."
        );
        describe_counter!("search_watch_ticks_total", "Watcher search runs.");
        describe_counter!(
            "search_watch_fresh_total",
            "Postings reported by watchers as new."
        );
        describe_histogram!(
            "search_results_returned",
            "Postings returned per search."
        );
    });
}
