//! Pipeline run results
//!
//! One `RunResult` per orchestrator invocation. This is the only artifact
//! consumers (alerting, persistence, scoring) may depend on; zero edges
//! with a non-empty error list is a valid, non-crashing outcome.

use crate::edge::RankedEdge;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Which pipeline stage a recorded failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Source,
    Processor,
    Detector,
    Escalation,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Source => write!(f, "source"),
            PipelineStage::Processor => write!(f, "processor"),
            PipelineStage::Detector => write!(f, "detector"),
            PipelineStage::Escalation => write!(f, "escalation"),
        }
    }
}

/// A non-fatal failure recorded during a run, keyed by the plug-in name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    /// Stage the failing plug-in belongs to
    pub stage: PipelineStage,
    /// Name of the failing source/processor/detector, or the market id for
    /// escalation failures
    pub source: String,
    /// Error description
    pub error: String,
}

impl RunError {
    pub fn new(stage: PipelineStage, source: impl Into<String>, error: impl ToString) -> Self {
        Self {
            stage,
            source: source.into(),
            error: error.to_string(),
        }
    }
}

/// Wall-clock and accounting statistics for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Unique id for this run
    pub run_id: Uuid,
    /// Total pipeline wall-clock time
    pub total_time_ms: u64,
    /// Per-source fetch time; absent for sources served from cache
    pub per_source_time_ms: BTreeMap<String, u64>,
    /// Sources fetched over the network this run
    pub sources_fetched: usize,
    /// Sources served from a fresh cache entry
    pub sources_cached: usize,
    /// Dollars charged to the escalation ledger this run
    pub escalation_spend: Decimal,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_time_ms: 0,
            per_source_time_ms: BTreeMap::new(),
            sources_fetched: 0,
            sources_cached: 0,
            escalation_spend: Decimal::ZERO,
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of one full pipeline pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Ranked, deduplicated edges
    pub edges: Vec<RankedEdge>,
    /// Non-fatal failures recorded along the way
    pub errors: Vec<RunError>,
    /// Timing and accounting
    pub stats: RunStats,
}

impl RunResult {
    /// True when at least one plug-in failed this run
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
