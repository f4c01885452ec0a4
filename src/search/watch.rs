// src/search/watch.rs
//! Periodic re-run of one query that reports only postings this watcher has
//! not reported before. The seen-set belongs to the watcher task; the engine
//! stays stateless.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use metrics::counter;
use tokio::task::JoinHandle;

use crate::search::dedup::fingerprint;
use crate::search::engine::AggregationEngine;
use crate::search::types::{AggregationResult, Posting, Query};

#[async_trait::async_trait]
pub trait WatchSink: Send + Sync {
    /// Receives the new postings of one tick (never called with an empty slice).
    async fn deliver(&self, query: &Query, fresh: Vec<Posting>) -> Result<()>;
}

/// Test/demo sink that keeps every delivered batch.
#[derive(Default)]
pub struct CollectingSink {
    pub batches: Mutex<Vec<Vec<Posting>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Vec<Posting>> {
        match self.batches.lock() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl WatchSink for CollectingSink {
    async fn deliver(&self, _query: &Query, fresh: Vec<Posting>) -> Result<()> {
        match self.batches.lock() {
            Ok(mut g) => g.push(fresh),
            Err(poison) => poison.into_inner().push(fresh),
        }
        Ok(())
    }
}

/// Split a result into postings not yet in `seen`, recording them.
pub fn take_fresh(seen: &mut HashSet<String>, result: AggregationResult) -> Vec<Posting> {
    result
        .postings
        .into_iter()
        .filter(|p| seen.insert(fingerprint(p)))
        .collect()
}

/// Spawn the watcher. The first tick fires immediately. Abort the handle to
/// stop it. An invalid query stops the watcher after logging.
pub fn spawn_watch<S>(
    engine: Arc<AggregationEngine>,
    query: Query,
    interval: Duration,
    sink: Arc<S>,
) -> JoinHandle<()>
where
    S: WatchSink + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut seen: HashSet<String> = HashSet::new();
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp().max(0) as u64;

            let result = match engine.search(&query).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(target: "search", error = %e, "watch query rejected, stopping");
                    return;
                }
            };
            let degraded = result.is_degraded();
            let fresh = take_fresh(&mut seen, result);

            counter!("search_watch_ticks_total").increment(1);
            tracing::info!(
                target: "search",
                ts = now,
                fresh = fresh.len(),
                seen = seen.len(),
                degraded,
                "watch tick"
            );

            if fresh.is_empty() {
                continue;
            }
            counter!("search_watch_fresh_total").increment(fresh.len() as u64);
            if let Err(e) = sink.deliver(&query, fresh).await {
                tracing::warn!(target: "search", error = ?e, "watch sink failed");
            }
        }
    })
}
