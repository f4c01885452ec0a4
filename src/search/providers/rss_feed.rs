// src/search/providers/rss_feed.rs
//! Generic RSS job feed. Feeds are not query-driven, so items are filtered
//! locally against the keywords (any token) and location (substring).

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::search::normalize::{Field, FieldMap};
use crate::search::providers::{check_status, clean_keywords, http_client, transport_error};
use crate::search::types::{Query, RawRecord, SourceAdapter, SourceError};

static FIELDS: FieldMap = FieldMap {
    id: Field::First(&["/guid"]),
    title: Field::First(&["/title"]),
    company: Field::First(&["/company", "/author"]),
    location: Field::First(&["/location", "/region"]),
    description: Field::First(&["/description"]),
    url: Field::First(&["/link"]),
};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    description: Option<String>,
    company: Option<String>,
    author: Option<String>,
    location: Option<String>,
    region: Option<String>,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

pub struct RssFeedAdapter {
    name: String,
    mode: Mode,
}

impl RssFeedAdapter {
    pub fn from_url(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client: http_client(timeout),
            },
        }
    }

    pub fn from_fixture_str(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items(&self, xml: &str, query: &Query) -> Result<Vec<RawRecord>, SourceError> {
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean)
            .map_err(|e| SourceError::parse(format!("{} rss xml: {e}", self.name)))?;

        let tokens: Vec<String> = clean_keywords(query.keywords())
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        let wanted_loc = query.location().trim().to_lowercase();

        let out = rss
            .channel
            .item
            .into_iter()
            .filter(|it| matches_keywords(it, &tokens))
            .filter(|it| matches_location(it, &wanted_loc))
            .take(query.per_source_limit())
            .map(|it| {
                RawRecord::new(json!({
                    "guid": it.guid.map(|g| g.value),
                    "title": it.title,
                    "link": it.link,
                    "description": it.description,
                    "company": it.company,
                    "author": it.author,
                    "location": it.location,
                    "region": it.region,
                }))
            })
            .collect();
        Ok(out)
    }
}

fn matches_keywords(it: &Item, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let hay = format!(
        "{} {}",
        it.title.as_deref().unwrap_or_default(),
        it.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    tokens.iter().any(|t| hay.contains(t.as_str()))
}

/// Items without any location are kept; the feed may simply not say.
fn matches_location(it: &Item, wanted: &str) -> bool {
    if wanted.is_empty() {
        return true;
    }
    match it.location.as_deref().or(it.region.as_deref()) {
        Some(loc) if !loc.trim().is_empty() => loc.to_lowercase().contains(wanted),
        _ => true,
    }
}

#[async_trait]
impl SourceAdapter for RssFeedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_map(&self) -> &FieldMap {
        &FIELDS
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, SourceError> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_items(xml, query),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url.as_str())
                    .send()
                    .await
                    .map_err(|e| transport_error(&self.name, e))?;
                check_status(&self.name, resp.status())?;
                let body = resp
                    .text()
                    .await
                    .map_err(|e| transport_error(&self.name, e))?;
                self.parse_items(&body, query)
            }
        }
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
