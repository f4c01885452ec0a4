// src/search/fanout.rs
//! Fan-out coordinator: one Tokio task per adapter, each under its own
//! timeout, collected back in registration order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};

use crate::search::types::{FailureReason, FetchOutcome, Query, SourceAdapter, SourceError};

/// One adapter's result as returned by [`gather`].
#[derive(Debug, Clone)]
pub struct Gathered {
    pub source: String,
    pub outcome: FetchOutcome,
    pub elapsed: Duration,
}

/// Invoke every adapter concurrently and wait for all of them.
///
/// - A timeout or failure only affects the adapter it belongs to.
/// - The returned order is the order of `adapters`, not completion order.
/// - Wall-clock cost is bounded by `per_adapter_timeout`.
///
/// Tasks are detached: dropping the returned future does not cancel
/// in-flight fetches, they still finish or hit their own timeout.
pub async fn gather(
    query: &Query,
    adapters: &[Arc<dyn SourceAdapter>],
    per_adapter_timeout: Duration,
) -> Vec<Gathered> {
    let query = Arc::new(query.clone());
    let started = Instant::now();

    let handles: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = Arc::clone(&query);
            tokio::spawn(async move {
                let t0 = Instant::now();
                let outcome =
                    match tokio::time::timeout(per_adapter_timeout, adapter.fetch(&query)).await {
                        Ok(Ok(records)) => FetchOutcome::Success(records),
                        Ok(Err(e)) => FetchOutcome::Failure(e),
                        Err(_) => FetchOutcome::Failure(SourceError::timeout(format!(
                            "no response within {} ms",
                            per_adapter_timeout.as_millis()
                        ))),
                    };
                (outcome, t0.elapsed())
            })
        })
        .collect();

    let mut out = Vec::with_capacity(handles.len());
    for (adapter, handle) in adapters.iter().zip(handles) {
        let source = adapter.name().to_string();
        let (outcome, elapsed) = match handle.await {
            Ok(v) => v,
            Err(e) => (
                FetchOutcome::Failure(SourceError::new(
                    FailureReason::Panicked,
                    format!("adapter task aborted: {e}"),
                )),
                started.elapsed(),
            ),
        };

        histogram!("search_source_fetch_ms", "source" => source.clone())
            .record(elapsed.as_secs_f64() * 1_000.0);

        match &outcome {
            FetchOutcome::Success(records) => {
                tracing::debug!(
                    target: "search",
                    source = %source,
                    records = records.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "source ok"
                );
            }
            FetchOutcome::Failure(e) => {
                tracing::warn!(
                    target: "search",
                    source = %source,
                    reason = %e.reason,
                    detail = %e.detail,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "source failed"
                );
                counter!(
                    "search_source_failures_total",
                    "source" => source.clone(),
                    "reason" => e.reason.as_str()
                )
                .increment(1);
            }
        }

        out.push(Gathered {
            source,
            outcome,
            elapsed,
        });
    }

    out
}
