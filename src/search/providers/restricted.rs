// src/search/providers/restricted.rs
use async_trait::async_trait;

use crate::search::normalize::FieldMap;
use crate::search::types::{Query, RawRecord, SourceAdapter, SourceError};

/// Boards that forbid automated access. They stay registered so callers
/// see them as `Unsupported` in the per-source report.
pub struct RestrictedAdapter {
    board: &'static str,
}

impl RestrictedAdapter {
    pub fn new(board: &'static str) -> Self {
        Self { board }
    }

    pub fn linkedin() -> Self {
        Self::new("linkedin")
    }

    pub fn glassdoor() -> Self {
        Self::new("glassdoor")
    }

    pub fn board(&self) -> &'static str {
        self.board
    }
}

#[async_trait]
impl SourceAdapter for RestrictedAdapter {
    fn name(&self) -> &str {
        self.board
    }

    fn field_map(&self) -> &FieldMap {
        &FieldMap::FLAT
    }

    async fn fetch(&self, _query: &Query) -> Result<Vec<RawRecord>, SourceError> {
        tracing::debug!(target: "search", source = self.board, "skipping restricted board");
        Err(SourceError::unsupported(format!(
            "{}: automated access is restricted",
            self.board
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::FailureReason;

    #[tokio::test]
    async fn always_unsupported() {
        let a = RestrictedAdapter::linkedin();
        let e = a.fetch(&Query::new("rust", "")).await.unwrap_err();
        assert_eq!(e.reason, FailureReason::Unsupported);
        assert_eq!(a.name(), "linkedin");
    }
}
