//! Trading signal ("edge") types

use crate::market::Market;
use crate::signal::Signal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the market the signal favors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Yes,
    No,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Yes => write!(f, "YES"),
            Direction::No => write!(f, "NO"),
        }
    }
}

/// Detector-declared time pressure on a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Normal
    }
}

/// Severity tier assigned by the aggregator from absolute edge thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Watchlist,
    Actionable,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Watchlist => write!(f, "watchlist"),
            Severity::Actionable => write!(f, "actionable"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A single directional trading signal produced by a detector.
///
/// Edges are transient: recomputed every run, never the system of record.
/// Producers guarantee `edge >= their declared min_edge`; the aggregator
/// relies on that contract rather than re-validating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The market the signal is about
    pub market: Market,

    /// Recommended side
    pub direction: Direction,

    /// Magnitude of the mispricing (0.00 - 1.00)
    pub edge: Decimal,

    /// Producer's confidence in the signal (0.00 - 1.00)
    pub confidence: Decimal,

    /// Human-readable explanation of the signal
    pub reason: String,

    /// Detector-specific evidence
    pub signal: Signal,

    /// Time pressure declared by the producer
    #[serde(default)]
    pub urgency: Urgency,
}

impl Edge {
    /// Composite quality score used for deduplication and default ranking
    pub fn score(&self) -> Decimal {
        self.edge * self.confidence
    }

    /// Dedup identity: market id plus the signal's sub-discriminator
    pub fn dedup_key(&self) -> (String, Option<String>) {
        (
            self.market.id.clone(),
            self.signal.subkey().map(str::to_string),
        )
    }
}

/// An edge that survived aggregation, with its assigned tier and final score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEdge {
    /// The underlying signal
    pub edge: Edge,

    /// Severity tier from absolute edge thresholds
    pub severity: Severity,

    /// Ranking score (reranker output when configured, else edge * confidence)
    pub score: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn severity_orders_by_tier() {
        assert!(Severity::Critical > Severity::Actionable);
        assert!(Severity::Actionable > Severity::Watchlist);
    }

    #[test]
    fn score_is_edge_times_confidence() {
        let market = Market {
            platform: crate::Platform::Polymarket,
            id: "m1".to_string(),
            ticker: None,
            title: "t".to_string(),
            category: None,
            price: dec!(0.50),
            volume: None,
            liquidity: None,
            close_time: None,
            url: None,
        };
        let edge = Edge {
            market,
            direction: Direction::Yes,
            edge: dec!(0.20),
            confidence: dec!(0.90),
            reason: String::new(),
            signal: Signal::External {
                detector: "d".to_string(),
                payload: serde_json::Value::Null,
            },
            urgency: Urgency::default(),
        };
        assert_eq!(edge.score(), dec!(0.18));
    }
}
