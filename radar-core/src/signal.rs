//! Detector signal payloads
//!
//! Every edge carries a `Signal` identifying which detector family produced
//! it along with the detector-specific evidence. Known families get typed
//! variants; third-party detectors use the open `External` variant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Evidence payload attached to an edge, discriminated by detector family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// A statistical estimate disagrees with the market price
    PriceDivergence {
        /// Externally implied probability of the YES outcome
        implied_probability: Decimal,
        /// Market YES price at detection time
        market_price: Decimal,
        /// Number of observations behind the estimate, if known
        #[serde(skip_serializing_if = "Option::is_none")]
        sample_size: Option<u64>,
    },

    /// The same market trades at a different price on the other venue
    CrossVenue {
        /// YES price on the counterpart venue
        counterpart_price: Decimal,
        /// Absolute YES price difference between venues
        spread: Decimal,
    },

    /// A burst of news coverage matching a market keyword
    NewsPulse {
        /// The keyword that matched
        keyword: String,
        /// Number of matching articles in the window
        article_count: u64,
        /// Outlets that carried the story
        sources: Vec<String>,
    },

    /// Output of the escalation controller's analysis tiers
    Research {
        /// Estimated fair YES probability, if the analysis produced one
        #[serde(skip_serializing_if = "Option::is_none")]
        fair_value: Option<Decimal>,
        /// One-paragraph reasoning summary
        summary: String,
        /// Source URLs cited by the analysis
        citations: Vec<String>,
    },

    /// Open variant for third-party detectors
    External {
        /// Name of the producing detector
        detector: String,
        /// Detector-defined evidence
        payload: serde_json::Value,
    },
}

impl Signal {
    /// Sub-signal discriminator for deduplication.
    ///
    /// Most families produce at most one signal per market and collapse on
    /// the market id alone. Keyword-driven families can legitimately emit
    /// several coexisting signals for one market; those return the keyword
    /// so the dedup key becomes `(market id, keyword)`.
    pub fn subkey(&self) -> Option<&str> {
        match self {
            Signal::NewsPulse { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    /// Short label for the producing detector family
    pub fn family(&self) -> &'static str {
        match self {
            Signal::PriceDivergence { .. } => "price_divergence",
            Signal::CrossVenue { .. } => "cross_venue",
            Signal::NewsPulse { .. } => "news_pulse",
            Signal::Research { .. } => "research",
            Signal::External { .. } => "external",
        }
    }
}
