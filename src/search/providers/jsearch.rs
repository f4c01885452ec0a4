// src/search/providers/jsearch.rs
//! JSearch (RapidAPI) job search. Needs `JSEARCH_API_KEY`; without it every
//! fetch resolves to `Unconfigured` instead of failing the request.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::search::normalize::{Field, FieldMap};
use crate::search::providers::{check_status, http_client, search_text, transport_error};
use crate::search::types::{Query, RawRecord, SourceAdapter, SourceError};

pub const NAME: &str = "jsearch";
pub const ENV_API_KEY: &str = "JSEARCH_API_KEY";

const BASE_URL: &str = "https://jsearch.p.rapidapi.com/search";
const API_HOST: &str = "jsearch.p.rapidapi.com";

static FIELDS: FieldMap = FieldMap {
    id: Field::First(&["/job_id"]),
    title: Field::First(&["/job_title"]),
    company: Field::First(&["/employer_name"]),
    location: Field::Join(&["/job_city", "/job_state", "/job_country"], ", "),
    description: Field::First(&["/job_description"]),
    url: Field::First(&["/job_apply_link", "/job_google_link"]),
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        api_key: Option<String>,
    },
}

pub struct JSearchAdapter {
    mode: Mode,
}

impl JSearchAdapter {
    /// Reads the key from `JSEARCH_API_KEY`; a missing key is not an error here.
    pub fn from_env(timeout: Duration) -> Self {
        let api_key = std::env::var(ENV_API_KEY).ok();
        Self::with_api_key(api_key, timeout)
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

    /// Serve a canned response body instead of calling the API.
    pub fn from_fixture_str(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_body(body: &str, limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        let resp: SearchResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::parse(format!("jsearch json: {e}")))?;
        Ok(resp
            .data
            .into_iter()
            .take(limit)
            .map(RawRecord::new)
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for JSearchAdapter {
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

                let text = search_text(query.keywords(), query.location());
                let resp = client
                    .get(BASE_URL)
                    .query(&[("query", text.as_str()), ("page", "1"), ("num_pages", "1")])
                    .header("X-RapidAPI-Key", key)
                    .header("X-RapidAPI-Host", API_HOST)
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
