// src/search/providers/mod.rs
pub mod google_jobs;
pub mod jsearch;
pub mod mock;
pub mod restricted;
pub mod rss_feed;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

use crate::search::config::SearchConfig;
use crate::search::types::{SourceAdapter, SourceError};

use self::google_jobs::GoogleJobsAdapter;
use self::jsearch::JSearchAdapter;
use self::mock::MockBoard;
use self::restricted::RestrictedAdapter;
use self::rss_feed::RssFeedAdapter;

const USER_AGENT: &str = "job-search-aggregator/0.1";

/// Provider-friendly keywords: commas and a bare " or " become spaces,
/// whitespace is collapsed.
pub fn clean_keywords(keywords: &str) -> String {
    keywords
        .replace(',', " ")
        .replace(" or ", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Free-text query for providers that take a single search string.
pub fn search_text(keywords: &str, location: &str) -> String {
    let kw = clean_keywords(keywords);
    let loc = location.trim();
    if loc.is_empty() {
        kw
    } else {
        format!("{kw} in {loc}")
    }
}

/// Shared HTTP client for adapters. Falls back to a default client if the
/// builder fails (it only does so on TLS backend init problems).
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Map a non-2xx status to a `SourceError`.
pub(crate) fn check_status(provider: &str, status: StatusCode) -> Result<(), SourceError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::rate_limited(format!(
            "{provider} answered HTTP {status}"
        ))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::unconfigured(
            format!("{provider} rejected credentials (HTTP {status})"),
        )),
        _ => Err(SourceError::transport(format!(
            "{provider} answered HTTP {status}"
        ))),
    }
}

pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(format!("{provider}: {e}"))
    } else {
        SourceError::transport(format!("{provider}: {e}"))
    }
}

/// Build the adapters enabled by `cfg`, in a fixed registration order:
/// JSearch, Google Jobs, configured RSS feeds, restricted boards. The mock board is only
/// registered when named explicitly in `cfg.sources`.
pub fn builtin_adapters(cfg: &SearchConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let http_timeout = cfg.per_adapter_timeout();
    let mut out: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if cfg.is_enabled(jsearch::NAME) {
        out.push(Arc::new(JSearchAdapter::from_env(http_timeout)));
    }
    if cfg.is_enabled(google_jobs::NAME) {
        out.push(Arc::new(GoogleJobsAdapter::from_env(http_timeout)));
    }
    for feed in &cfg.rss_feeds {
        if cfg.is_enabled(&feed.name) {
            out.push(Arc::new(RssFeedAdapter::from_url(
                feed.name.clone(),
                feed.url.clone(),
                http_timeout,
            )));
        }
    }
    for adapter in [RestrictedAdapter::linkedin(), RestrictedAdapter::glassdoor()] {
        if cfg.is_enabled(adapter.board()) {
            out.push(Arc::new(adapter));
        }
    }
    if cfg
        .sources
        .iter()
        .any(|s| s.eq_ignore_ascii_case(mock::NAME))
    {
        out.push(Arc::new(MockBoard::new(mock::NAME, 5)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::RssFeedCfg;
    use crate::search::types::FailureReason;

    #[test]
    fn keywords_are_cleaned_like_a_search_box() {
        assert_eq!(clean_keywords("rust, go or python"), "rust go python");
        assert_eq!(clean_keywords("  data   engineer "), "data engineer");
        assert_eq!(search_text("rust", ""), "rust");
        assert_eq!(search_text("rust,tokio", " Berlin "), "rust tokio in Berlin");
    }

    #[test]
    fn status_mapping() {
        assert!(check_status("p", StatusCode::OK).is_ok());
        let e = check_status("p", StatusCode::TOO_MANY_REQUESTS).unwrap_err();
        assert_eq!(e.reason, FailureReason::RateLimited);
        let e = check_status("p", StatusCode::FORBIDDEN).unwrap_err();
        assert_eq!(e.reason, FailureReason::Unconfigured);
        let e = check_status("p", StatusCode::BAD_GATEWAY).unwrap_err();
        assert_eq!(e.reason, FailureReason::Transport);
    }

    #[test]
    fn builtin_registry_respects_enabled_sources() {
        let all = builtin_adapters(&SearchConfig::default());
        let names: Vec<_> = all.iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["jsearch", "google_jobs", "linkedin", "glassdoor"]);

        let cfg = SearchConfig {
            sources: vec!["remote-rss".into(), "mock".into()],
            rss_feeds: vec![RssFeedCfg {
                name: "remote-rss".into(),
                url: "https://feeds.test/jobs.rss".into(),
            }],
            ..SearchConfig::default()
        };
        let names: Vec<_> = builtin_adapters(&cfg)
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(names, vec!["remote-rss", "mock"]);
    }
}
