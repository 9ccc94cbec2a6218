//! Edge aggregation and deduplication
//!
//! Turns the raw multiset of edges from every detector into the ranked,
//! bounded list a consumer acts on. Pure and idempotent: aggregating the
//! same input twice yields identical output.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use radar_core::{Edge, Platform, RankedEdge, Severity};

/// Optional external re-ranking hook (e.g. an ML scorer). The aggregator
/// never depends on its internals; absent a reranker the score is
/// `edge * confidence`.
pub type Reranker = Arc<dyn Fn(&Edge) -> Decimal + Send + Sync>;

/// Thresholds and bounds for aggregation
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Edges below this magnitude are dropped entirely
    pub min_edge: Decimal,
    /// Absolute edge at or above which an edge is `Actionable`
    pub actionable_threshold: Decimal,
    /// Absolute edge at or above which an edge is `Critical`
    pub critical_threshold: Decimal,
    /// Maximum number of ranked edges returned per run
    pub max_results: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_edge: dec!(0.03),
            actionable_threshold: dec!(0.08),
            critical_threshold: dec!(0.15),
            max_results: 25,
        }
    }
}

/// Merges, deduplicates, tiers, and ranks detector output
pub struct EdgeAggregator {
    config: AggregatorConfig,
    reranker: Option<Reranker>,
}

impl EdgeAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            reranker: None,
        }
    }

    /// Attach an external reranker used for scoring instead of
    /// `edge * confidence`
    pub fn with_reranker(mut self, reranker: Reranker) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Aggregate one run's worth of edges into the ranked result set
    pub fn aggregate(&self, edges: Vec<Edge>) -> Vec<RankedEdge> {
        let input_count = edges.len();

        // Dedup key: (platform, market id, signal subkey). Competing signals
        // for the same market collapse to the one maximizing
        // edge * confidence; first seen wins ties.
        let mut survivors: HashMap<(Platform, String, Option<String>), Edge> = HashMap::new();
        for edge in edges {
            if edge.edge < self.config.min_edge {
                continue;
            }
            let (id, subkey) = edge.dedup_key();
            let key = (edge.market.platform, id, subkey);
            match survivors.get(&key) {
                Some(existing) if existing.score() >= edge.score() => {}
                _ => {
                    survivors.insert(key, edge);
                }
            }
        }

        let mut ranked: Vec<RankedEdge> = survivors
            .into_values()
            .map(|edge| {
                let severity = self.tier(edge.edge);
                let score = match &self.reranker {
                    Some(rerank) => rerank(&edge),
                    None => edge.score(),
                };
                RankedEdge {
                    edge,
                    severity,
                    score,
                }
            })
            .collect();

        // Full tiebreak chain keeps the output byte-identical across calls
        ranked.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.edge.market.id.cmp(&b.edge.market.id))
                .then_with(|| {
                    a.edge
                        .signal
                        .subkey()
                        .unwrap_or("")
                        .cmp(b.edge.signal.subkey().unwrap_or(""))
                })
        });
        ranked.truncate(self.config.max_results);

        debug!(
            "Aggregated {} raw edges into {} ranked edges",
            input_count,
            ranked.len()
        );
        ranked
    }

    fn tier(&self, edge: Decimal) -> Severity {
        if edge >= self.config.critical_threshold {
            Severity::Critical
        } else if edge >= self.config.actionable_threshold {
            Severity::Actionable
        } else {
            Severity::Watchlist
        }
    }
}
