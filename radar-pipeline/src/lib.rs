//! Pipeline orchestration for the Prediction Market Edge Radar
//!
//! This crate provides the plug-in pipeline that schedules data acquisition,
//! isolates failures, caches expensive fetches, fans work out to independent
//! detectors, aggregates their conflicting outputs, and gates an optional
//! budget-constrained escalation step.

pub mod aggregator;
pub mod cache;
pub mod data;
pub mod detectors;
pub mod edge_log;
pub mod escalation;
pub mod orchestrator;
pub mod registry;

pub use aggregator::{AggregatorConfig, EdgeAggregator, Reranker};
pub use cache::{CacheStats, CacheStatus, SourceCache};
pub use data::SourceData;
pub use detectors::CrossVenueDetector;
pub use edge_log::{EdgeLog, EdgeLogError};
pub use escalation::{
    Analysis, CooldownStore, EscalationConfig, EscalationController, EscalationOutcome,
    LlmAnalyst, MarketAnalyst, MemoryCooldownStore, NewsMention, ResearchTools, SpendLedger,
    SqliteCooldownStore,
};
pub use orchestrator::{Orchestrator, PipelineConfig};
pub use registry::{DataSource, Detector, PipelineRegistry, Processor, SourceCategory};
