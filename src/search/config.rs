// src/search/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::search::normalize::DEFAULT_SNIPPET_CHARS;
use crate::search::types::DEFAULT_MAX_RESULTS_PER_SOURCE;

const ENV_PATH: &str = "SEARCH_CONFIG_PATH";
const ENV_TIMEOUT_MS: &str = "SEARCH_TIMEOUT_MS";
const ENV_MAX_RESULTS: &str = "SEARCH_MAX_RESULTS";

fn default_timeout_ms() -> u64 {
    8_000
}
fn default_per_source() -> usize {
    DEFAULT_MAX_RESULTS_PER_SOURCE
}
fn default_snippet_chars() -> usize {
    DEFAULT_SNIPPET_CHARS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssFeedCfg {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_timeout_ms")]
    pub per_adapter_timeout_ms: u64,
    #[serde(default = "default_per_source")]
    pub max_results_per_source: usize,
    /// Overall cap after dedup. `None` keeps everything.
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default = "default_snippet_chars")]
    pub snippet_max_chars: usize,
    /// Enabled built-in adapters by name. Empty enables all of them.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub rss_feeds: Vec<RssFeedCfg>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_adapter_timeout_ms: default_timeout_ms(),
            max_results_per_source: default_per_source(),
            max_results: None,
            snippet_max_chars: default_snippet_chars(),
            sources: Vec::new(),
            rss_feeds: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn per_adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.per_adapter_timeout_ms)
    }

    /// Case-insensitive membership in `sources`; an empty list enables all.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.sources.is_empty() || self.sources.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading search config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing search config {}", path.display()))?;
        Ok(cfg.apply_env_overrides().sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $SEARCH_CONFIG_PATH
    /// 2) config/search.toml
    /// 3) config/search.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("SEARCH_CONFIG_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/search.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/search.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default().apply_env_overrides().sanitized())
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Some(ms) = env_parse::<u64>(ENV_TIMEOUT_MS) {
            self.per_adapter_timeout_ms = ms;
        }
        if let Some(n) = env_parse::<usize>(ENV_MAX_RESULTS) {
            self.max_results = Some(n);
        }
        self
    }

    /// Zero timeouts / bounds fall back to defaults; names are trimmed.
    fn sanitized(mut self) -> Self {
        if self.per_adapter_timeout_ms == 0 {
            self.per_adapter_timeout_ms = default_timeout_ms();
        }
        if self.max_results_per_source == 0 {
            self.max_results_per_source = default_per_source();
        }
        if self.snippet_max_chars == 0 {
            self.snippet_max_chars = default_snippet_chars();
        }
        self.sources = self
            .sources
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.rss_feeds.retain(|f| !f.name.trim().is_empty() && !f.url.trim().is_empty());
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(v) => match v.trim().parse::<T>() {
            Ok(x) => Some(x),
            Err(_) => {
                tracing::warn!(key, value = %v, "ignoring unparsable env override");
                None
            }
        },
        Err(_) => None,
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<SearchConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("json");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("toml");
    }
    // Unknown extension: JSON if it looks like an object, else TOML.
    if s.trim_start().starts_with('{') {
        if let Ok(v) = serde_json::from_str(s) {
            return Ok(v);
        }
    }
    toml::from_str(s).map_err(|e| anyhow!("unsupported search config format: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_parse_with_defaults() {
        let t = parse_config(
            r#"
per_adapter_timeout_ms = 1500
sources = ["jsearch", " mock "]

[[rss_feeds]]
name = "remote"
url = "https://feeds.test/jobs.rss"
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(t.per_adapter_timeout_ms, 1500);
        assert_eq!(t.max_results_per_source, 10);
        assert_eq!(t.snippet_max_chars, 500);
        assert_eq!(t.rss_feeds.len(), 1);

        let j = parse_config(r#"{ "max_results": 25 }"#, "json").unwrap();
        assert_eq!(j.max_results, Some(25));
        assert_eq!(j.per_adapter_timeout_ms, 8_000);
    }

    #[test]
    fn sanitize_restores_defaults_and_trims() {
        let cfg = SearchConfig {
            per_adapter_timeout_ms: 0,
            max_results_per_source: 0,
            snippet_max_chars: 0,
            sources: vec![" mock ".into(), "".into()],
            rss_feeds: vec![RssFeedCfg {
                name: " ".into(),
                url: "https://x".into(),
            }],
            ..SearchConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.per_adapter_timeout_ms, 8_000);
        assert_eq!(cfg.max_results_per_source, 10);
        assert_eq!(cfg.snippet_max_chars, 500);
        assert_eq!(cfg.sources, vec!["mock".to_string()]);
        assert!(cfg.rss_feeds.is_empty());
    }

    #[test]
    fn empty_sources_enables_everything() {
        let cfg = SearchConfig::default();
        assert!(cfg.is_enabled("anything"));
        let cfg = SearchConfig {
            sources: vec!["JSearch".into()],
            ..SearchConfig::default()
        };
        assert!(cfg.is_enabled("jsearch"));
        assert!(!cfg.is_enabled("mock"));
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);
        env::remove_var(ENV_TIMEOUT_MS);
        env::remove_var(ENV_MAX_RESULTS);

        let v = SearchConfig::load_default().unwrap();
        assert_eq!(v, SearchConfig::default());

        let p_json = tmp.path().join("search.json");
        fs::write(&p_json, r#"{ "per_adapter_timeout_ms": 250 }"#).unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = SearchConfig::load_default().unwrap();
        assert_eq!(v2.per_adapter_timeout_ms, 250);
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
