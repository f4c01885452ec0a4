//! Runs one aggregated search over simulated boards (one slow, one broken,
//! two overlapping) and prints the listing plus per-source status.
//!
//! Usage: `cargo run --bin search_demo -- "data engineer" "Remote"`

use std::time::Duration;

use job_search_aggregator::search::providers::mock::{MockBehavior, MockBoard};
use job_search_aggregator::search::providers::restricted::RestrictedAdapter;
use job_search_aggregator::search::render::render_top_listings;
use job_search_aggregator::{AggregationEngine, OutcomeStatus, Query};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let keywords = args.next().unwrap_or_else(|| "Rust Engineer".to_string());
    let location = args.next().unwrap_or_default();

    let engine = AggregationEngine::builder()
        .per_adapter_timeout(Duration::from_millis(1_500))
        .adapter(MockBoard::new("indeed", 5).with_latency(Duration::from_millis(500)))
        .adapter(MockBoard::new("ziprecruiter", 3).with_latency(Duration::from_millis(200)))
        .adapter(MockBoard::new("monster", 5).with_behavior(MockBehavior::Hang))
        .adapter(RestrictedAdapter::linkedin())
        .build()?;

    let result = engine.search(&Query::new(keywords, location)).await?;

    println!("{}", render_top_listings(&result.postings, 5));
    for r in &result.sources {
        let status = match &r.status {
            OutcomeStatus::Success => "SUCCESS".to_string(),
            OutcomeStatus::Failure { reason, detail } => format!("{reason} ({detail})"),
        };
        println!(
            "{:<14} {:<40} fetched={} kept={} {}ms",
            r.source, status, r.fetched, r.kept, r.elapsed_ms
        );
    }
    println!("duplicates removed: {}", result.duplicates_removed);
    Ok(())
}
