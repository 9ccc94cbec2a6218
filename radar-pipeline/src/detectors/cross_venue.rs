//! Cross-venue spread detector
//!
//! Matches markets listed on both venues by normalized title and flags the
//! YES price gap. The cheaper venue's YES is reported as undervalued
//! relative to its counterpart.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use radar_core::{Direction, Edge, Market, Platform, RadarResult, Signal, Urgency};

use crate::data::SourceData;
use crate::registry::Detector;

#[derive(Debug, Clone)]
pub struct CrossVenueConfig {
    /// Smallest spread worth reporting
    pub min_edge: Decimal,
    /// Confidence assigned to title-matched pairs
    pub confidence: Decimal,
}

impl Default for CrossVenueConfig {
    fn default() -> Self {
        Self {
            min_edge: dec!(0.04),
            confidence: dec!(0.6),
        }
    }
}

pub struct CrossVenueDetector {
    config: CrossVenueConfig,
}

impl CrossVenueDetector {
    pub fn new(config: CrossVenueConfig) -> Self {
        Self { config }
    }

    /// Lowercased alphanumeric words, single-spaced; venue-specific
    /// punctuation and casing must not break pairing
    fn normalize_title(title: &str) -> String {
        title
            .to_lowercase()
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CrossVenueDetector {
    fn default() -> Self {
        Self::new(CrossVenueConfig::default())
    }
}

#[async_trait]
impl Detector for CrossVenueDetector {
    fn name(&self) -> &str {
        "cross_venue"
    }

    fn description(&self) -> &str {
        "YES price divergence for the same market across venues"
    }

    fn required_source_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn min_edge(&self) -> Decimal {
        self.config.min_edge
    }

    async fn detect(&self, _data: &SourceData, markets: &[Market]) -> RadarResult<Vec<Edge>> {
        let mut by_title: HashMap<String, (Option<&Market>, Option<&Market>)> = HashMap::new();
        for market in markets {
            let entry = by_title
                .entry(Self::normalize_title(&market.title))
                .or_default();
            match market.platform {
                Platform::Kalshi => entry.0 = Some(market),
                Platform::Polymarket => entry.1 = Some(market),
            }
        }

        let mut edges = Vec::new();
        for (kalshi, polymarket) in by_title.into_values() {
            let (Some(k), Some(p)) = (kalshi, polymarket) else {
                continue;
            };

            let spread = (k.price - p.price).abs();
            if spread < self.config.min_edge {
                continue;
            }

            let (cheap, rich) = if k.price <= p.price { (k, p) } else { (p, k) };
            edges.push(Edge {
                market: cheap.clone(),
                direction: Direction::Yes,
                edge: spread,
                confidence: self.config.confidence,
                reason: format!(
                    "YES trades at {} on {} vs {} on {}",
                    cheap.price, cheap.platform, rich.price, rich.platform
                ),
                signal: Signal::CrossVenue {
                    counterpart_price: rich.price,
                    spread,
                },
                urgency: Urgency::Normal,
            });
        }

        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(platform: Platform, id: &str, title: &str, price: Decimal) -> Market {
        Market {
            platform,
            id: id.to_string(),
            ticker: None,
            title: title.to_string(),
            category: None,
            price,
            volume: Some(dec!(20000)),
            liquidity: None,
            close_time: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn flags_matched_pair_with_spread() {
        let detector = CrossVenueDetector::default();
        let markets = vec![
            market(Platform::Kalshi, "k1", "Will X win the election?", dec!(0.60)),
            market(
                Platform::Polymarket,
                "p1",
                "Will X win the Election",
                dec!(0.52),
            ),
        ];

        let edges = detector.detect(&SourceData::new(), &markets).await.unwrap();
        assert_eq!(edges.len(), 1);
        // Edge sits on the cheaper venue
        assert_eq!(edges[0].market.id, "p1");
        assert_eq!(edges[0].edge, dec!(0.08));
        assert_eq!(edges[0].direction, Direction::Yes);
        match &edges[0].signal {
            Signal::CrossVenue {
                counterpart_price,
                spread,
            } => {
                assert_eq!(*counterpart_price, dec!(0.60));
                assert_eq!(*spread, dec!(0.08));
            }
            other => panic!("unexpected signal: {:?}", other),
        }
    }

    #[tokio::test]
    async fn narrow_spreads_and_unmatched_markets_are_quiet() {
        let detector = CrossVenueDetector::default();
        let markets = vec![
            market(Platform::Kalshi, "k1", "Rate cut in March?", dec!(0.50)),
            market(Platform::Polymarket, "p1", "Rate cut in March?", dec!(0.52)),
            market(Platform::Kalshi, "k2", "Only listed on Kalshi", dec!(0.10)),
        ];

        let edges = detector.detect(&SourceData::new(), &markets).await.unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn title_normalization_strips_punctuation_and_case() {
        assert_eq!(
            CrossVenueDetector::normalize_title("Will X win the Election?"),
            CrossVenueDetector::normalize_title("will x win   the election")
        );
    }
}
