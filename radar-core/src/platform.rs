//! Platform definitions for prediction markets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Venues whose markets feed the canonical universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Kalshi - US regulated prediction market
    Kalshi,
    /// Polymarket - Crypto-based prediction market
    Polymarket,
}

impl Platform {
    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Kalshi => "Kalshi",
            Platform::Polymarket => "Polymarket",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Polymarket).unwrap(),
            "\"polymarket\""
        );
        let parsed: Platform = serde_json::from_str("\"kalshi\"").unwrap();
        assert_eq!(parsed, Platform::Kalshi);
    }
}
