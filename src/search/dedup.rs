// src/search/dedup.rs
use std::collections::HashSet;

use crate::search::types::Posting;

/// Lowercase, drop the fragment and any trailing slash.
fn canonical_url(url: &str) -> String {
    let u = url.trim();
    let u = u.split_once('#').map(|(head, _)| head).unwrap_or(u);
    u.trim_end_matches('/').to_lowercase()
}

fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Duplicate key: the url when present, otherwise `title|company|location`.
/// The prefixes keep the two key spaces from colliding.
pub fn fingerprint(p: &Posting) -> String {
    let url = canonical_url(&p.url);
    if !url.is_empty() {
        return format!("url:{url}");
    }
    format!(
        "tcl:{}|{}|{}",
        fold(&p.title),
        fold(&p.company),
        fold(&p.location)
    )
}

/// First-seen-wins dedup. Returns the survivors (input order preserved) and
/// the number of postings removed.
pub fn dedupe_counted(postings: Vec<Posting>) -> (Vec<Posting>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(postings.len());
    let mut keep = Vec::with_capacity(postings.len());
    let mut removed = 0usize;

    for p in postings {
        if !seen.insert(fingerprint(&p)) {
            removed += 1;
            continue;
        }
        keep.push(p);
    }

    (keep, removed)
}

pub fn dedupe(postings: Vec<Posting>) -> Vec<Posting> {
    dedupe_counted(postings).0
}
