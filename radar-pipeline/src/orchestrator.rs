//! Run orchestrator
//!
//! Executes exactly one full pipeline pass: fetch due sources, run
//! processors, build the canonical market universe, fan out detectors,
//! optionally escalate, aggregate. The caller always receives a
//! `RunResult`; plug-in failures of any kind are recorded, never raised.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use radar_core::{Market, PipelineStage, RadarError, RadarResult, RunError, RunResult, RunStats};

use crate::aggregator::EdgeAggregator;
use crate::cache::{CacheStatus, SourceCache};
use crate::data::SourceData;
use crate::edge_log::EdgeLog;
use crate::escalation::{EscalationController, ResearchTools};
use crate::registry::{PipelineRegistry, SourceCategory};

/// Orchestrator knobs, read once at startup
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Deadline for a single source fetch; a slow provider degrades to
    /// "stale cache or error", never a hung run
    pub fetch_timeout: Duration,
    /// Concurrent fetch cap, sized to the expected number of providers
    pub max_concurrent_fetches: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 8,
        }
    }
}

struct FetchOutcome {
    name: String,
    ttl: Duration,
    elapsed_ms: u64,
    result: RadarResult<Value>,
    stale_fallback: Option<Value>,
}

/// Drives one pipeline pass end to end
pub struct Orchestrator {
    registry: Arc<PipelineRegistry>,
    cache: Arc<SourceCache>,
    aggregator: EdgeAggregator,
    escalation: Option<EscalationController>,
    edge_log: Option<EdgeLog>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<PipelineRegistry>,
        cache: Arc<SourceCache>,
        aggregator: EdgeAggregator,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            aggregator,
            escalation: None,
            edge_log: None,
            config,
        }
    }

    /// Enable the budget-gated escalation pass
    pub fn with_escalation(mut self, controller: EscalationController) -> Self {
        self.escalation = Some(controller);
        self
    }

    /// Log ranked edges to SQLite for later calibration
    pub fn with_edge_log(mut self, log: EdgeLog) -> Self {
        self.edge_log = Some(log);
        self
    }

    /// Execute one full pipeline pass
    #[instrument(skip(self))]
    pub async fn run(&self) -> RunResult {
        let started = Instant::now();
        let mut stats = RunStats::new();
        let mut errors: Vec<RunError> = Vec::new();
        let mut data = SourceData::new();

        // Sources: serve fresh cache entries, fetch the rest concurrently.
        // A failed fetch keeps its stale entry in play.
        let mut pending = Vec::new();
        for source in self.registry.sources() {
            match self.cache.get(source.name()) {
                Some((value, CacheStatus::Fresh)) => {
                    data.insert(source.name(), value);
                    stats.sources_cached += 1;
                }
                cached => {
                    let stale_fallback = cached.map(|(value, _)| value);
                    pending.push((source, stale_fallback));
                }
            }
        }

        let fetch_timeout = self.config.fetch_timeout;
        let outcomes: Vec<FetchOutcome> =
            stream::iter(pending.into_iter().map(|(source, stale_fallback)| async move {
                let name = source.name().to_string();
                let fetch_started = Instant::now();
                let result = match tokio::time::timeout(fetch_timeout, source.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(RadarError::timeout(fetch_timeout.as_secs())),
                };
                FetchOutcome {
                    name,
                    ttl: source.ttl(),
                    elapsed_ms: fetch_started.elapsed().as_millis() as u64,
                    result,
                    stale_fallback,
                }
            }))
            .buffer_unordered(self.config.max_concurrent_fetches)
            .collect()
            .await;

        for outcome in outcomes {
            stats
                .per_source_time_ms
                .insert(outcome.name.clone(), outcome.elapsed_ms);
            match outcome.result {
                Ok(value) => {
                    self.cache.put(&outcome.name, value.clone(), outcome.ttl);
                    data.insert(outcome.name, value);
                    stats.sources_fetched += 1;
                }
                Err(e) => {
                    warn!("Source {} failed: {}", outcome.name, e);
                    errors.push(RunError::new(
                        PipelineStage::Source,
                        outcome.name.as_str(),
                        &e,
                    ));
                    if let Some(value) = outcome.stale_fallback {
                        debug!("Serving stale cache for {}", outcome.name);
                        data.insert(outcome.name, value);
                    }
                }
            }
        }

        // Processors: every source has been attempted by now. A failing
        // processor leaves its output key absent.
        for processor in self.registry.processors() {
            let inputs = data.restricted_to(&processor.input_source_names());
            match processor.process(&inputs) {
                Ok(value) => data.insert(processor.output_key().to_string(), value),
                Err(e) => {
                    warn!("Processor {} failed: {}", processor.name(), e);
                    errors.push(RunError::new(PipelineStage::Processor, processor.name(), e));
                }
            }
        }

        // Canonical market universe from markets-category sources
        let mut markets: Vec<Market> = Vec::new();
        for name in self
            .registry
            .source_names_in_category(SourceCategory::Markets)
        {
            let Some(value) = data.get(&name) else {
                continue;
            };
            match serde_json::from_value::<Vec<Market>>(value.clone()) {
                Ok(list) => {
                    debug!("{} contributed {} markets", name, list.len());
                    markets.extend(list);
                }
                Err(e) => {
                    errors.push(RunError::new(
                        PipelineStage::Source,
                        name.as_str(),
                        RadarError::parse(format!("market payload: {}", e)),
                    ));
                }
            }
        }

        // Detectors: spawned so a panic is contained to its own task
        let data = Arc::new(data);
        let markets = Arc::new(markets);
        let mut handles = Vec::new();
        for detector in self.registry.detectors() {
            let name = detector.name().to_string();
            let data = Arc::clone(&data);
            let markets = Arc::clone(&markets);
            let handle = tokio::spawn(async move { detector.detect(&data, &markets).await });
            handles.push((name, handle));
        }

        let mut raw_edges = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(edges)) => {
                    debug!("Detector {} produced {} edges", name, edges.len());
                    raw_edges.extend(edges);
                }
                Ok(Err(e)) => {
                    warn!("Detector {} failed: {}", name, e);
                    errors.push(RunError::new(PipelineStage::Detector, name.as_str(), e));
                }
                Err(e) => {
                    warn!("Detector {} aborted: {}", name, e);
                    errors.push(RunError::new(
                        PipelineStage::Detector,
                        name.as_str(),
                        format!("task aborted: {}", e),
                    ));
                }
            }
        }

        if let Some(controller) = &self.escalation {
            let tools = ResearchTools::new(
                Arc::clone(&data),
                Arc::clone(&markets),
                Arc::clone(&self.registry),
                Arc::clone(&self.cache),
            );
            let outcome = controller.run(&tools).await;
            stats.escalation_spend = outcome.spent;
            errors.extend(outcome.errors);
            raw_edges.extend(outcome.edges);
        }

        let edges = self.aggregator.aggregate(raw_edges);

        if let Some(log) = &self.edge_log {
            if let Err(e) = log.record(&stats.run_id, &edges) {
                warn!("Edge log write failed: {}", e);
            }
        }

        stats.total_time_ms = started.elapsed().as_millis() as u64;
        let cache_stats = self.cache.stats();
        info!(
            "Run {} complete: {} edges, {} errors, {}ms (cache: {}/{} fresh)",
            stats.run_id,
            edges.len(),
            errors.len(),
            stats.total_time_ms,
            cache_stats.fresh,
            cache_stats.total
        );

        RunResult {
            edges,
            errors,
            stats,
        }
    }
}
