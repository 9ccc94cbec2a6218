//! Market data structures for prediction markets

use crate::platform::Platform;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable market in the canonical cross-platform shape.
///
/// Platform-specific market sources are normalized into this record before
/// any detector runs; the resulting universe is an immutable snapshot for
/// the duration of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Which platform this market is from
    pub platform: Platform,

    /// Unique identifier on the platform
    pub id: String,

    /// Platform-specific ticker symbol (e.g., "KXBTC-100K-25DEC31" for Kalshi)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    /// Human-readable title/question
    pub title: String,

    /// Category (e.g., "Politics", "Crypto", "Sports")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Current YES price (0.00 - 1.00, represents probability)
    pub price: Decimal,

    /// Trading volume (in platform's native unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Available liquidity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Decimal>,

    /// When the market closes for trading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Utc>>,

    /// URL to the market on the platform's website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Market {
    /// Calculate the implied probability from the YES price
    pub fn implied_probability(&self) -> Decimal {
        self.price
    }

    /// Trading volume, treating "unknown" as zero for filtering and sorting
    pub fn volume_or_zero(&self) -> Decimal {
        self.volume.unwrap_or(Decimal::ZERO)
    }

    /// Check if the market closes within the given number of hours
    pub fn closes_within_hours(&self, hours: i64, now: DateTime<Utc>) -> bool {
        match self.close_time {
            Some(close) => close > now && (close - now).num_hours() < hours,
            None => false,
        }
    }
}
