//! Job Search Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server: loads search config, registers the built-in
//! source adapters and exposes `/search`, `/sources`, `/health`, `/metrics`.

use job_search_aggregator::metrics::Metrics;
use job_search_aggregator::search::config::SearchConfig;
use job_search_aggregator::{create_router, engine_from_config, AppState};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("search=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables JSEARCH_API_KEY / SERPAPI_API_KEY / SEARCH_CONFIG_PATH from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = SearchConfig::load_default().map_err(shuttle_runtime::Error::Custom)?;
    let engine =
        engine_from_config(&cfg).map_err(|e| shuttle_runtime::Error::Custom(e.into()))?;
    tracing::info!(
        target: "search",
        sources = ?engine.source_names(),
        timeout_ms = cfg.per_adapter_timeout_ms,
        "search engine ready"
    );

    let mut router = create_router(AppState::new(engine));
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
