// src/search/render.rs
use std::fmt::Write as _;

use crate::search::types::Posting;

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

/// Human-readable summary of the first `n` postings, for chat/CLI output.
pub fn render_top_listings(postings: &[Posting], n: usize) -> String {
    if postings.is_empty() || n == 0 {
        return "No jobs found.".to_string();
    }

    let mut out = String::from("Top job listings:\n\n");
    for (i, p) in postings.iter().take(n).enumerate() {
        let _ = write!(
            out,
            "{}. Title: {}\n   Company: {}\n   Location: {}\n   URL: {}\n\n",
            i + 1,
            or_na(&p.title),
            or_na(&p.company),
            or_na(&p.location),
            or_na(&p.url),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, url: &str) -> Posting {
        Posting {
            id: "s:1".into(),
            title: title.into(),
            company: String::new(),
            location: "Remote".into(),
            description_snippet: String::new(),
            url: url.into(),
            source_name: "s".into(),
        }
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(render_top_listings(&[], 5), "No jobs found.");
    }

    #[test]
    fn numbers_entries_and_fills_missing_fields() {
        let ps = vec![
            posting("Engineer", "https://x.test/1"),
            posting("Designer", ""),
            posting("Ops", "https://x.test/3"),
        ];
        let out = render_top_listings(&ps, 2);
        assert!(out.starts_with("Top job listings:"));
        assert!(out.contains("1. Title: Engineer"));
        assert!(out.contains("   Company: N/A"));
        assert!(out.contains(
            "2. Title: Designer\n   Company: N/A\n   Location: Remote\n   URL: N/A"
        ));
        assert!(!out.contains("Ops"));
    }
}
