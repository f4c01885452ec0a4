// src/search/providers/mock.rs
//! Deterministic job board for demos and tests. Postings look like a real
//! board's, with simulated latency and optional failure modes.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::search::normalize::FieldMap;
use crate::search::types::{FailureReason, Query, RawRecord, SourceAdapter, SourceError};

pub const NAME: &str = "mock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Succeed,
    Fail(FailureReason),
    /// Never resolves; only the coordinator's timeout ends it.
    Hang,
}

#[derive(Debug, Clone)]
pub struct MockBoard {
    name: String,
    count: usize,
    latency: Duration,
    behavior: MockBehavior,
}

impl MockBoard {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            latency: Duration::ZERO,
            behavior: MockBehavior::Succeed,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn records(&self, query: &Query) -> Vec<RawRecord> {
        let kw = query.keywords().trim();
        (1..=self.count)
            .take(query.per_source_limit())
            .map(|i| {
                RawRecord::new(json!({
                    "id": format!("mock_{i}"),
                    "title": format!("Senior {kw}"),
                    "company": format!("Tech Company {i}"),
                    "location": query.location(),
                    "description": format!(
                        "Seeking a {kw} with experience in Python, SQL, and Cloud. \
                         Responsibilities include building scalable systems. \
                         Knowledge of Docker is a plus."
                    ),
                    "url": format!("https://example.com/job/{i}"),
                }))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for MockBoard {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_map(&self) -> &FieldMap {
        &FieldMap::FLAT
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.behavior {
            MockBehavior::Succeed => Ok(self.records(query)),
            MockBehavior::Fail(reason) => Err(SourceError::new(reason, "simulated failure")),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}
