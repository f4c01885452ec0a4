// src/search/providers/google_jobs.rs
//! Google Jobs through SerpAPI (`engine=google_jobs`). Needs
//! `SERPAPI_API_KEY`; without it every fetch resolves to `Unconfigured`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::search::normalize::{Field, FieldMap};
use crate::search::providers::{check_status, clean_keywords, http_client, transport_error};
use crate::search::types::{Query, RawRecord, SourceAdapter, SourceError};

pub const NAME: &str = "google_jobs";
pub const ENV_API_KEY: &str = "SERPAPI_API_KEY";

const BASE_URL: &str = "https://serpapi.com/search.json";

/// SerpAPI reports an empty result page as an `error` string on HTTP 200.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

static FIELDS: FieldMap = FieldMap {
    id: Field::First(&["/job_id"]),
    title: Field::First(&["/title"]),
    company: Field::First(&["/company_name"]),
    location: Field::First(&["/location"]),
    description: Field::First(&["/description"]),
    url: Field::First(&[
        "/apply_options/0/link",
        "/share_link",
        "/related_links/0/link",
    ]),
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        api_key: Option<String>,
    },
}

pub struct GoogleJobsAdapter {
    mode: Mode,
}

impl GoogleJobsAdapter {
    /// Reads the key from `SERPAPI_API_KEY`; a missing key is not an error here.
    pub fn from_env(timeout: Duration) -> Self {
        Self::with_api_key(std::env::var(ENV_API_KEY).ok(), timeout)
    }

    pub fn with_api_key(api_key: Option<String>, timeout: Duration) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            mode: Mode::Http {
                client: http_client(timeout),
                api_key,
            },
        }
    }

    pub fn from_fixture_str(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_body(body: &str, limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        let resp: SearchResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::parse(format!("google_jobs json: {e}")))?;
        match resp.error {
            Some(msg) if resp.jobs_results.is_empty() && !msg.contains(NO_RESULTS_MARKER) => {
                Err(SourceError::transport(format!("google_jobs: {msg}")))
            }
            _ => Ok(resp
                .jobs_results
                .into_iter()
                .take(limit)
                .map(RawRecord::new)
                .collect()),
        }
    }
}

#[async_trait]
impl SourceAdapter for GoogleJobsAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn field_map(&self) -> &FieldMap {
        &FIELDS
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, SourceError> {
        let limit = query.per_source_limit();
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body, limit),
            Mode::Http { client, api_key } => {
                let key = api_key
                    .as_deref()
                    .ok_or_else(|| SourceError::unconfigured(format!("{ENV_API_KEY} is not set")))?;

                let q = clean_keywords(query.keywords());
                let mut params = vec![
                    ("engine", "google_jobs"),
                    ("q", q.as_str()),
                    ("api_key", key),
                ];
                let location = query.location().trim();
                if !location.is_empty() {
                    params.push(("location", location));
                }

                let resp = client
                    .get(BASE_URL)
                    .query(&params)
                    .send()
                    .await
                    .map_err(|e| transport_error(NAME, e))?;

                check_status(NAME, resp.status())?;
                let body = resp.text().await.map_err(|e| transport_error(NAME, e))?;
                Self::parse_body(&body, limit)
            }
        }
    }
}
