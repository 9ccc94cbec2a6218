//! Daemon configuration
//!
//! Everything is read once from the environment at startup; nothing is
//! re-read mid-run.

use std::time::Duration;

use rust_decimal::Decimal;

use radar_pipeline::{AggregatorConfig, EscalationConfig, PipelineConfig};

/// Top-level daemon configuration
#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// Seconds between pipeline runs
    pub run_interval: Duration,
    /// TTL for registered news feeds
    pub news_ttl: Duration,
    /// TTL for market-universe endpoints
    pub markets_ttl: Duration,
    /// Optional market-universe endpoints, one per venue
    pub kalshi_markets_url: Option<String>,
    pub polymarket_markets_url: Option<String>,
    /// Optional SQLite path for cooldown persistence
    pub cooldown_db_path: Option<String>,
    /// Optional SQLite path for the edge calibration log
    pub edge_log_path: Option<String>,
    pub pipeline: PipelineConfig,
    pub aggregator: AggregatorConfig,
    pub escalation: EscalationConfig,
}

impl RadarConfig {
    pub fn from_env() -> Self {
        let mut escalation = EscalationConfig::default();
        escalation.min_volume = env_decimal("RADAR_ESCALATION_MIN_VOLUME", escalation.min_volume);
        escalation.cooldown_minutes =
            env_i64("RADAR_COOLDOWN_MINUTES", escalation.cooldown_minutes);
        escalation.max_markets_per_run = env_usize(
            "RADAR_ESCALATION_MAX_MARKETS",
            escalation.max_markets_per_run,
        );
        escalation.per_run_budget = env_decimal("RADAR_RUN_BUDGET", escalation.per_run_budget);
        escalation.scan_budget = env_decimal("RADAR_SCAN_BUDGET", escalation.scan_budget);
        escalation.deep_budget = env_decimal("RADAR_DEEP_BUDGET", escalation.deep_budget);
        escalation.escalate_threshold =
            env_decimal("RADAR_ESCALATE_THRESHOLD", escalation.escalate_threshold);
        escalation.scan_timeout =
            Duration::from_secs(env_u64("RADAR_SCAN_TIMEOUT_SECS", 60));
        escalation.deep_timeout =
            Duration::from_secs(env_u64("RADAR_DEEP_TIMEOUT_SECS", 120));

        let mut aggregator = AggregatorConfig::default();
        aggregator.min_edge = env_decimal("RADAR_MIN_EDGE", aggregator.min_edge);
        aggregator.max_results = env_usize("RADAR_MAX_RESULTS", aggregator.max_results);

        let mut pipeline = PipelineConfig::default();
        pipeline.fetch_timeout = Duration::from_secs(env_u64("RADAR_FETCH_TIMEOUT_SECS", 30));
        pipeline.max_concurrent_fetches =
            env_usize("RADAR_MAX_CONCURRENT_FETCHES", pipeline.max_concurrent_fetches);

        Self {
            run_interval: Duration::from_secs(env_u64("RADAR_RUN_INTERVAL_SECS", 300)),
            news_ttl: Duration::from_secs(env_u64("RADAR_NEWS_TTL_SECS", 120)),
            markets_ttl: Duration::from_secs(env_u64("RADAR_MARKETS_TTL_SECS", 180)),
            kalshi_markets_url: env_opt("RADAR_KALSHI_MARKETS_URL"),
            polymarket_markets_url: env_opt("RADAR_POLYMARKET_MARKETS_URL"),
            cooldown_db_path: env_opt("RADAR_COOLDOWN_DB_PATH"),
            edge_log_path: env_opt("RADAR_EDGE_LOG_PATH"),
            pipeline,
            aggregator,
            escalation,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
