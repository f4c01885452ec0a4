// tests/config_load.rs
use std::{env, fs};

use job_search_aggregator::engine_from_config;
use job_search_aggregator::search::config::SearchConfig;

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("search.toml");
    fs::write(
        &p_toml,
        r#"
per_adapter_timeout_ms = 3000
max_results = 20
sources = ["jsearch", "remote-rust"]

[[rss_feeds]]
name = "remote-rust"
url = "https://feeds.test/rust.rss"
"#,
    )
    .unwrap();
    let t = SearchConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.per_adapter_timeout_ms, 3000);
    assert_eq!(t.max_results, Some(20));
    assert_eq!(t.rss_feeds[0].name, "remote-rust");

    let engine = engine_from_config(&t).unwrap();
    assert_eq!(engine.source_names(), vec!["jsearch", "remote-rust"]);
    assert_eq!(engine.settings().max_results, Some(20));

    let p_json = dir.path().join("search.json");
    fs::write(&p_json, r#"{ "snippet_max_chars": 0, "sources": ["mock"] }"#).unwrap();
    let j = SearchConfig::load_from(&p_json).unwrap();
    assert_eq!(j.snippet_max_chars, 500);
    assert_eq!(
        engine_from_config(&j).unwrap().source_names(),
        vec!["mock"]
    );
}

#[test]
fn broken_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("search.toml");
    fs::write(&p, "per_adapter_timeout_ms = \"soon\"").unwrap();
    assert!(SearchConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn env_path_and_overrides() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var("SEARCH_CONFIG_PATH");
    env::remove_var("SEARCH_TIMEOUT_MS");
    env::remove_var("SEARCH_MAX_RESULTS");

    // 1) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("search.toml"), "per_adapter_timeout_ms = 1200").unwrap();
    assert_eq!(SearchConfig::load_default().unwrap().per_adapter_timeout_ms, 1200);

    // 2) Env overrides win over the file
    env::set_var("SEARCH_TIMEOUT_MS", "900");
    env::set_var("SEARCH_MAX_RESULTS", "7");
    let v = SearchConfig::load_default().unwrap();
    assert_eq!(v.per_adapter_timeout_ms, 900);
    assert_eq!(v.max_results, Some(7));
    env::remove_var("SEARCH_TIMEOUT_MS");
    env::remove_var("SEARCH_MAX_RESULTS");

    // 3) A dangling SEARCH_CONFIG_PATH is reported
    env::set_var("SEARCH_CONFIG_PATH", tmp.path().join("nope.toml"));
    assert!(SearchConfig::load_default().is_err());
    env::remove_var("SEARCH_CONFIG_PATH");

    env::set_current_dir(&old).unwrap();
}
