// src/search/normalize.rs
//! Raw record -> canonical `Posting`.
//!
//! Every adapter ships a `FieldMap` describing where its fields live; the
//! policy applied on top of it is the same for all sources: trim, collapse
//! whitespace, clip the description, namespace the id, and drop the record
//! only when both title and url come out empty. Nothing here returns an error.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::search::types::{Posting, RawRecord};

/// Default cap for `Posting::description_snippet`, in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// Where one canonical field comes from, as JSON pointers into the record.
#[derive(Debug, Clone, Copy)]
pub enum Field {
    /// First pointer whose value is non-empty after cleaning.
    First(&'static [&'static str]),
    /// All non-empty values, joined with the separator.
    Join(&'static [&'static str], &'static str),
    /// Provider never supplies this field.
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    /// Provider-local id; empty means "synthesize one".
    pub id: Field,
    pub title: Field,
    pub company: Field,
    pub location: Field,
    pub description: Field,
    pub url: Field,
}

impl FieldMap {
    /// Records that already use the canonical key names.
    pub const FLAT: FieldMap = FieldMap {
        id: Field::First(&["/id"]),
        title: Field::First(&["/title"]),
        company: Field::First(&["/company"]),
        location: Field::First(&["/location"]),
        description: Field::First(&["/description"]),
        url: Field::First(&["/url"]),
    };
}

/// Scalars become strings; null, arrays and objects degrade to "".
fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn extract(record: &RawRecord, field: Field, clean: fn(&str) -> String) -> String {
    let lookup = |p: &&str| {
        record
            .pointer(p)
            .map(scalar_to_string)
            .map(|s| clean(&s))
            .filter(|s| !s.is_empty())
    };
    match field {
        Field::First(paths) => paths.iter().find_map(lookup).unwrap_or_default(),
        Field::Join(paths, sep) => paths.iter().filter_map(lookup).collect::<Vec<_>>().join(sep),
        Field::Absent => String::new(),
    }
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("static regex"))
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Decode entities, collapse whitespace, trim. Used for short fields.
pub fn clean_field(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    re_ws().replace_all(&decoded, " ").trim().to_string()
}

/// Description text: entities decoded, tags stripped, typographic quotes
/// folded to ASCII, whitespace collapsed.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();
    out = re_tags().replace_all(&out, " ").to_string();
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    re_ws().replace_all(&out, " ").trim().to_string()
}

/// Char-boundary-safe truncation.
pub fn clip_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

/// Stable id for records without a provider-local one.
pub fn synthetic_local_id(title: &str, company: &str, location: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.to_lowercase().as_bytes());
    hasher.update(b"|");
    hasher.update(company.to_lowercase().as_bytes());
    hasher.update(b"|");
    hasher.update(location.to_lowercase().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Map one raw record into a `Posting`, or `None` when title and url are
/// both empty.
pub fn normalize(
    source_name: &str,
    map: &FieldMap,
    record: &RawRecord,
    snippet_max_chars: usize,
) -> Option<Posting> {
    let title = extract(record, map.title, clean_field);
    let url = extract(record, map.url, trimmed);
    if title.is_empty() && url.is_empty() {
        return None;
    }

    let company = extract(record, map.company, clean_field);
    let location = extract(record, map.location, clean_field);
    let description = extract(record, map.description, normalize_text);

    let local_id = extract(record, map.id, clean_field);
    let local_id = if local_id.is_empty() {
        synthetic_local_id(&title, &company, &location)
    } else {
        local_id
    };

    Some(Posting {
        id: format!("{source_name}:{local_id}"),
        title,
        company,
        location,
        description_snippet: clip_chars(&description, snippet_max_chars),
        url,
        source_name: source_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> RawRecord {
        RawRecord::new(v)
    }

    #[test]
    fn trims_and_namespaces_id() {
        let r = rec(json!({
            "id": " 42 ",
            "title": "  Rust   Engineer ",
            "company": "Acme\n",
            "location": " Berlin ",
            "description": "<p>Build&nbsp;things</p>",
            "url": " https://x.test/42 "
        }));
        let p = normalize("board", &FieldMap::FLAT, &r, 500).unwrap();
        assert_eq!(p.id, "board:42");
        assert_eq!(p.title, "Rust Engineer");
        assert_eq!(p.company, "Acme");
        assert_eq!(p.location, "Berlin");
        assert_eq!(p.description_snippet, "Build things");
        assert_eq!(p.url, "https://x.test/42");
        assert_eq!(p.source_name, "board");
    }

    #[test]
    fn drops_only_when_title_and_url_missing() {
        let r = rec(json!({ "company": "Acme", "title": "   " }));
        assert!(normalize("board", &FieldMap::FLAT, &r, 500).is_none());

        let url_only = rec(json!({ "url": "https://x.test/1" }));
        assert!(normalize("board", &FieldMap::FLAT, &url_only, 500).is_some());

        let title_only = rec(json!({ "title": "Engineer" }));
        assert!(normalize("board", &FieldMap::FLAT, &title_only, 500).is_some());
    }

    #[test]
    fn malformed_fields_degrade_to_empty() {
        let r = rec(json!({
            "title": "Engineer",
            "company": { "nested": true },
            "location": ["a", "b"],
            "description": null,
            "id": 17
        }));
        let p = normalize("board", &FieldMap::FLAT, &r, 500).unwrap();
        assert_eq!(p.company, "");
        assert_eq!(p.location, "");
        assert_eq!(p.description_snippet, "");
        assert_eq!(p.id, "board:17");
    }

    #[test]
    fn non_object_record_is_dropped_not_panicking() {
        assert!(normalize("board", &FieldMap::FLAT, &rec(json!("junk")), 500).is_none());
        assert!(normalize("board", &FieldMap::FLAT, &rec(Value::Null), 500).is_none());
    }

    #[test]
    fn missing_id_falls_back_to_stable_hash() {
        let a = rec(json!({ "title": "Engineer", "company": "Acme", "location": "Remote" }));
        let b = rec(json!({ "title": "ENGINEER", "company": "acme", "location": "remote" }));
        let pa = normalize("s", &FieldMap::FLAT, &a, 500).unwrap();
        let pb = normalize("s", &FieldMap::FLAT, &b, 500).unwrap();
        assert_eq!(pa.id, pb.id);
        assert!(pa.id.starts_with("s:"));
        assert_eq!(pa.id.len(), "s:".len() + 16);
    }

    #[test]
    fn description_is_truncated_not_rejected() {
        let long = "é".repeat(800);
        let r = rec(json!({ "title": "Engineer", "description": long }));
        let p = normalize("s", &FieldMap::FLAT, &r, 500).unwrap();
        assert_eq!(p.description_snippet.chars().count(), 500);
    }

    #[test]
    fn join_and_first_fields() {
        const MAP: FieldMap = FieldMap {
            id: Field::Absent,
            title: Field::First(&["/job_title", "/title"]),
            company: Field::Absent,
            location: Field::Join(&["/city", "/state", "/country"], ", "),
            description: Field::Absent,
            url: Field::First(&["/apply", "/link"]),
        };
        let r = rec(json!({
            "title": "Fallback title",
            "city": "Austin",
            "state": "",
            "country": "US",
            "apply": "",
            "link": "https://x.test/a"
        }));
        let p = normalize("s", &MAP, &r, 500).unwrap();
        assert_eq!(p.title, "Fallback title");
        assert_eq!(p.location, "Austin, US");
        assert_eq!(p.url, "https://x.test/a");
    }

    #[test]
    fn normalize_text_strips_markup_and_quotes() {
        let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
        assert_eq!(normalize_text(s), r#"Hello world "ok""#);
    }

    #[test]
    fn clip_chars_is_char_safe() {
        assert_eq!(clip_chars("héllo", 2), "hé");
        assert_eq!(clip_chars("abc", 10), "abc");
        assert_eq!(clip_chars("", 3), "");
    }
}
