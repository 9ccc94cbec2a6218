//! Analysis tier contract and the default LLM-backed implementation

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use radar_core::{Direction, Edge, Market, RadarResult, Signal, Urgency};
use radar_research::{Assessment, ResearchClient};

use super::tools::ResearchTools;

/// Output of one analysis tier for one market
#[derive(Debug, Clone)]
pub struct Analysis {
    pub direction: Direction,
    /// Mispricing magnitude the tier believes in (0.00 - 1.00)
    pub edge: Decimal,
    pub confidence: Decimal,
    /// Estimated fair YES probability, if produced
    pub fair_value: Option<Decimal>,
    pub summary: String,
    pub citations: Vec<String>,
    /// Actual dollars this tier cost, charged to the run ledger
    pub cost: Decimal,
}

impl Analysis {
    /// Convert the final analysis into the common edge shape
    pub fn into_edge(self, market: Market) -> Edge {
        let urgency = if market.closes_within_hours(24, Utc::now()) {
            Urgency::High
        } else {
            Urgency::Normal
        };
        Edge {
            market,
            direction: self.direction,
            edge: self.edge,
            confidence: self.confidence,
            reason: self.summary.clone(),
            signal: Signal::Research {
                fair_value: self.fair_value,
                summary: self.summary,
                citations: self.citations,
            },
            urgency,
        }
    }
}

/// The two analysis tiers the escalation controller can invoke.
///
/// `initial_scan` is the cheap pass run for every selected candidate;
/// `deep_analysis` is the expensive pass run only when the scan's edge
/// clears the escalation threshold. Both receive a per-call cost cap and
/// run under a cancelling timeout owned by the controller.
#[async_trait]
pub trait MarketAnalyst: Send + Sync {
    async fn initial_scan(
        &self,
        market: &Market,
        tools: &ResearchTools,
        max_cost: Decimal,
    ) -> RadarResult<Analysis>;

    async fn deep_analysis(
        &self,
        market: &Market,
        initial: &Analysis,
        tools: &ResearchTools,
        max_cost: Decimal,
    ) -> RadarResult<Analysis>;
}

/// Default analyst: OpenAI-backed scan and deep-dive via `radar-research`
pub struct LlmAnalyst {
    client: ResearchClient,
}

impl LlmAnalyst {
    pub fn new(client: ResearchClient) -> Self {
        Self { client }
    }

    /// Headlines mentioning the market's salient title words, as prompt
    /// context
    fn news_context(&self, market: &Market, tools: &ResearchTools, per_keyword: usize) -> String {
        let mut lines = Vec::new();
        for word in market
            .title
            .split_whitespace()
            .filter(|w| w.len() > 4)
            .take(3)
        {
            let keyword: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            for mention in tools.news_mentioning(&keyword, per_keyword) {
                let line = format!("- {} ({})", mention.title, mention.source);
                if !lines.contains(&line) {
                    lines.push(line);
                }
            }
        }
        lines.join("\n")
    }

    fn to_analysis(market: &Market, assessment: Assessment) -> Analysis {
        let direction = if assessment.probability >= market.price {
            Direction::Yes
        } else {
            Direction::No
        };
        Analysis {
            direction,
            edge: (assessment.probability - market.price).abs(),
            confidence: assessment.confidence,
            fair_value: Some(assessment.probability),
            summary: assessment.summary,
            citations: assessment.citations,
            cost: assessment.cost,
        }
    }
}

#[async_trait]
impl MarketAnalyst for LlmAnalyst {
    async fn initial_scan(
        &self,
        market: &Market,
        tools: &ResearchTools,
        max_cost: Decimal,
    ) -> RadarResult<Analysis> {
        let context = self.news_context(market, tools, 3);
        let assessment = self
            .client
            .scan_market(&market.title, market.price, &context, max_cost)
            .await?;
        Ok(Self::to_analysis(market, assessment))
    }

    async fn deep_analysis(
        &self,
        market: &Market,
        initial: &Analysis,
        tools: &ResearchTools,
        max_cost: Decimal,
    ) -> RadarResult<Analysis> {
        let context = self.news_context(market, tools, 8);
        let assessment = self
            .client
            .deep_dive(
                &market.title,
                market.price,
                &initial.summary,
                &context,
                max_cost,
            )
            .await?;
        Ok(Self::to_analysis(market, assessment))
    }
}
