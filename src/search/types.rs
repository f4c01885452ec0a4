// src/search/types.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SearchError, SearchResult};
use crate::search::normalize::FieldMap;

/// Per-source bound used when neither the query nor the config sets one.
pub const DEFAULT_MAX_RESULTS_PER_SOURCE: usize = 10;

/// Immutable search input shared read-only by every adapter task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    keywords: String,
    location: String,
    max_results_per_source: Option<usize>,
}

impl Query {
    /// `location` may be empty, meaning "any".
    pub fn new(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            max_results_per_source: None,
        }
    }

    pub fn with_max_results_per_source(mut self, n: usize) -> Self {
        self.max_results_per_source = Some(n);
        self
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Explicit per-source bound, if the caller set one.
    pub fn max_results_per_source(&self) -> Option<usize> {
        self.max_results_per_source
    }

    /// Per-source bound adapters should honor.
    pub fn per_source_limit(&self) -> usize {
        self.max_results_per_source
            .unwrap_or(DEFAULT_MAX_RESULTS_PER_SOURCE)
    }

    pub fn validate(&self) -> SearchResult<()> {
        if self.keywords.trim().is_empty() {
            return Err(SearchError::InvalidQuery("keywords must not be empty".into()));
        }
        if self.max_results_per_source == Some(0) {
            return Err(SearchError::InvalidQuery(
                "max_results_per_source must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Adapter-specific record. The core only reads it through a `FieldMap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// JSON-pointer lookup (`"/employer/name"`).
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        self.0.pointer(path)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Canonical posting emitted by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// `"<source_name>:<provider_local_id>"`
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description_snippet: String,
    pub url: String,
    pub source_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    Timeout,
    Transport,
    RateLimited,
    Unconfigured,
    Unsupported,
    Parse,
    /// The adapter task aborted abnormally (panic inside `fetch`).
    Panicked,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "TIMEOUT",
            FailureReason::Transport => "TRANSPORT",
            FailureReason::RateLimited => "RATE_LIMITED",
            FailureReason::Unconfigured => "UNCONFIGURED",
            FailureReason::Unsupported => "UNSUPPORTED",
            FailureReason::Parse => "PARSE",
            FailureReason::Panicked => "PANICKED",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-level failure returned by `SourceAdapter::fetch`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}: {detail}")]
pub struct SourceError {
    pub reason: FailureReason,
    pub detail: String,
}

impl SourceError {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Timeout, detail)
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Transport, detail)
    }

    pub fn rate_limited(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::RateLimited, detail)
    }

    pub fn unconfigured(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Unconfigured, detail)
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Unsupported, detail)
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Parse, detail)
    }
}

/// Result of one adapter invocation. There is no partial state.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<RawRecord>),
    Failure(SourceError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            FetchOutcome::Success(_) => OutcomeStatus::Success,
            FetchOutcome::Failure(e) => OutcomeStatus::Failure {
                reason: e.reason,
                detail: e.detail.clone(),
            },
        }
    }
}

/// Serializable view of a `FetchOutcome`, without the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failure { reason: FailureReason, detail: String },
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            OutcomeStatus::Success => None,
            OutcomeStatus::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// Per-source diagnostics attached to every `AggregationResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    /// Raw records accepted from the adapter (after the per-source bound).
    pub fetched: usize,
    /// Records that became postings.
    pub kept: usize,
    /// Records dropped by the normalizer.
    pub dropped: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub postings: Vec<Posting>,
    /// One entry per registered adapter, in registration order.
    pub sources: Vec<SourceReport>,
    pub duplicates_removed: usize,
}

impl AggregationResult {
    pub fn status_of(&self, source: &str) -> Option<&OutcomeStatus> {
        self.sources
            .iter()
            .find(|r| r.source == source)
            .map(|r| &r.status)
    }

    /// True when at least one adapter was registered and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.sources.is_empty() && self.sources.iter().all(|r| !r.status.is_success())
    }

    /// True when some (but not necessarily all) sources failed.
    pub fn is_degraded(&self) -> bool {
        self.sources.iter().any(|r| !r.status.is_success())
    }
}

/// Capability contract every provider implements.
///
/// `fetch` returns `Ok(vec![])` for zero results. It must not block the
/// executor thread; the coordinator enforces the timeout only at await points.
/// Any retry/backoff lives inside the adapter.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Unique name; also the namespace for posting ids.
    fn name(&self) -> &str;

    /// Mapping table from this adapter's raw record shape to `Posting`.
    fn field_map(&self) -> &FieldMap;

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, SourceError>;
}
