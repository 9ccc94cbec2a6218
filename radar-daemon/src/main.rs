//! Prediction Market Edge Radar daemon
//!
//! Wires feeds, detectors, and the escalation controller into one pipeline
//! and polls it on a fixed cadence.

mod config;
mod scheduler;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use radar_feeds::{curated_feeds, JsonSource, RssSource};
use radar_pipeline::{
    CooldownStore, CrossVenueDetector, EdgeAggregator, EdgeLog, EscalationController, LlmAnalyst,
    MemoryCooldownStore, Orchestrator, PipelineRegistry, SourceCache, SourceCategory,
    SqliteCooldownStore,
};
use radar_research::ResearchClient;

use config::RadarConfig;
use scheduler::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,radar_daemon=debug")),
        )
        .init();

    info!("Starting Prediction Market Edge Radar");

    let config = RadarConfig::from_env();

    let mut registry = PipelineRegistry::new();

    // News feeds share one HTTP client
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    for feed in curated_feeds() {
        registry.register_source(Arc::new(RssSource::with_client(
            feed,
            http.clone(),
            config.news_ttl,
        )));
    }

    // Market universes, one endpoint per venue
    if let Some(url) = &config.kalshi_markets_url {
        registry.register_source(Arc::new(JsonSource::new(
            "kalshi-markets",
            url,
            SourceCategory::Markets,
            config.markets_ttl,
        )));
    }
    if let Some(url) = &config.polymarket_markets_url {
        registry.register_source(Arc::new(JsonSource::new(
            "polymarket-markets",
            url,
            SourceCategory::Markets,
            config.markets_ttl,
        )));
    }
    if config.kalshi_markets_url.is_none() && config.polymarket_markets_url.is_none() {
        warn!("No market endpoints configured; runs will have an empty market universe");
    }

    registry.register_detector(Arc::new(CrossVenueDetector::default()));

    info!(
        "Registry ready: {} sources, {} processors, {} detectors",
        registry.source_count(),
        registry.processor_count(),
        registry.detector_count()
    );

    let mut orchestrator = Orchestrator::new(
        Arc::new(registry),
        Arc::new(SourceCache::new()),
        EdgeAggregator::new(config.aggregator.clone()),
        config.pipeline.clone(),
    );

    // Escalation requires an OpenAI key; without one the radar still runs,
    // just without the expensive tier
    match ResearchClient::new() {
        Ok(client) => {
            let cooldowns: Arc<dyn CooldownStore> = match &config.cooldown_db_path {
                Some(path) => Arc::new(SqliteCooldownStore::new(path)?),
                None => Arc::new(MemoryCooldownStore::new()),
            };
            let controller = EscalationController::new(
                Arc::new(LlmAnalyst::new(client)),
                cooldowns,
                config.escalation.clone(),
            );
            orchestrator = orchestrator.with_escalation(controller);
            info!("Escalation enabled (budget ${} per run)", config.escalation.per_run_budget);
        }
        Err(e) => {
            warn!("Escalation disabled: {}", e);
        }
    }

    if let Some(path) = &config.edge_log_path {
        orchestrator = orchestrator.with_edge_log(EdgeLog::new(path)?);
        info!("Edge calibration log enabled at {}", path);
    }

    let scheduler = Scheduler::new(config.run_interval);
    info!(
        "Polling every {}s; press Ctrl-C to stop",
        config.run_interval.as_secs()
    );

    tokio::select! {
        _ = scheduler.run(&orchestrator) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
