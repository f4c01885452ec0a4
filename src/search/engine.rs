//! # Aggregation Engine
//! Facade over fan-out, normalization and dedup. Adapters are injected
//! through [`EngineBuilder`]; the engine itself holds no per-request state,
//! so one instance can serve concurrent searches.
//!
//! Only `InvalidQuery` aborts a search. Source failures are reported in
//! `AggregationResult::sources` and never surface as errors.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};

use crate::error::{SearchError, SearchResult};
use crate::search::config::SearchConfig;
use crate::search::dedup::dedupe_counted;
use crate::search::ensure_metrics_described;
use crate::search::fanout::gather;
use crate::search::normalize::{normalize, DEFAULT_SNIPPET_CHARS};
use crate::search::types::{
    AggregationResult, FetchOutcome, Posting, Query, SourceAdapter, SourceReport,
    DEFAULT_MAX_RESULTS_PER_SOURCE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub per_adapter_timeout: Duration,
    /// Used when the query does not set its own bound.
    pub max_results_per_source: usize,
    /// Cap applied after dedup unless the caller passes an explicit limit.
    pub max_results: Option<usize>,
    pub snippet_max_chars: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            per_adapter_timeout: Duration::from_secs(8),
            max_results_per_source: DEFAULT_MAX_RESULTS_PER_SOURCE,
            max_results: None,
            snippet_max_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

impl From<&SearchConfig> for EngineSettings {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            per_adapter_timeout: cfg.per_adapter_timeout(),
            max_results_per_source: cfg.max_results_per_source,
            max_results: cfg.max_results,
            snippet_max_chars: cfg.snippet_max_chars,
        }
    }
}

/// Adapter registry. Registration order is the merge order.
#[derive(Default)]
pub struct EngineBuilder {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    settings: EngineSettings,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn per_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.settings.per_adapter_timeout = timeout;
        self
    }

    pub fn adapter<A: SourceAdapter + 'static>(self, adapter: A) -> Self {
        self.adapter_arc(Arc::new(adapter))
    }

    pub fn adapter_arc(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn adapters<I>(mut self, adapters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SourceAdapter>>,
    {
        self.adapters.extend(adapters);
        self
    }

    /// Fails on duplicate adapter names: ids are namespaced by name.
    pub fn build(self) -> SearchResult<AggregationEngine> {
        let mut names = HashSet::new();
        for a in &self.adapters {
            if !names.insert(a.name().to_string()) {
                return Err(SearchError::DuplicateSource(a.name().to_string()));
            }
        }
        Ok(AggregationEngine {
            adapters: self.adapters,
            settings: self.settings,
        })
    }
}

pub struct AggregationEngine {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    settings: EngineSettings,
}

impl AggregationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Registered adapter names, in registration order.
    pub fn source_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Search with the configured overall cap.
    pub async fn search(&self, query: &Query) -> SearchResult<AggregationResult> {
        self.search_with_limit(query, self.settings.max_results).await
    }

    /// Search and keep at most `limit` postings (stable prefix of the
    /// deduplicated order). `None` keeps all of them.
    pub async fn search_with_limit(
        &self,
        query: &Query,
        limit: Option<usize>,
    ) -> SearchResult<AggregationResult> {
        ensure_metrics_described();
        counter!("search_requests_total").increment(1);

        if let Err(e) = query.validate() {
            counter!("search_invalid_queries_total").increment(1);
            tracing::info!(target: "search", error = %e, "rejected query");
            return Err(e);
        }

        let per_source = query
            .max_results_per_source()
            .unwrap_or(self.settings.max_results_per_source);
        let query = query.clone().with_max_results_per_source(per_source);

        let gathered = gather(&query, &self.adapters, self.settings.per_adapter_timeout).await;

        let mut merged: Vec<Posting> = Vec::new();
        let mut sources = Vec::with_capacity(gathered.len());

        for (adapter, g) in self.adapters.iter().zip(gathered) {
            let status = g.outcome.status();
            let (fetched, kept, dropped) = match g.outcome {
                FetchOutcome::Success(records) => {
                    let fetched = records.len().min(per_source);
                    let mut kept = 0usize;
                    let mut ids = HashSet::new();
                    for rec in records.iter().take(per_source) {
                        match normalize(
                            &g.source,
                            adapter.field_map(),
                            rec,
                            self.settings.snippet_max_chars,
                        ) {
                            Some(mut p) => {
                                p.id = unique_id(&mut ids, p.id);
                                merged.push(p);
                                kept += 1;
                            }
                            None => {
                                tracing::debug!(
                                    target: "search",
                                    source = %g.source,
                                    "dropped record without title and url"
                                );
                            }
                        }
                    }
                    (fetched, kept, fetched - kept)
                }
                FetchOutcome::Failure(_) => (0, 0, 0),
            };

            counter!("search_records_fetched_total", "source" => g.source.clone())
                .increment(fetched as u64);
            counter!("search_records_dropped_total", "source" => g.source.clone())
                .increment(dropped as u64);

            sources.push(SourceReport {
                source: g.source,
                status,
                fetched,
                kept,
                dropped,
                elapsed_ms: g.elapsed.as_millis() as u64,
            });
        }

        let (mut postings, duplicates_removed) = dedupe_counted(merged);
        if let Some(n) = limit {
            postings.truncate(n);
        }

        counter!("search_dedup_total").increment(duplicates_removed as u64);
        histogram!("search_results_returned").record(postings.len() as f64);

        let failed = sources.iter().filter(|r| !r.status.is_success()).count();
        tracing::info!(
            target: "search",
            keywords = %query.keywords(),
            location = %query.location(),
            sources = sources.len(),
            failed,
            duplicates = duplicates_removed,
            returned = postings.len(),
            "search finished"
        );

        Ok(AggregationResult {
            postings,
            sources,
            duplicates_removed,
        })
    }
}

/// Ids repeated within one source get an ordinal suffix (`:2`, `:3`, ...).
fn unique_id(seen: &mut HashSet<String>, id: String) -> String {
    if seen.insert(id.clone()) {
        return id;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{id}:{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
