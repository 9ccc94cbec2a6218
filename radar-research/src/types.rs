//! Assessment and cost accounting types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One analysis tier's verdict on a market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Estimated fair YES probability (0.00 - 1.00)
    pub probability: Decimal,
    /// Model's confidence in the estimate (0.00 - 1.00)
    pub confidence: Decimal,
    /// One-paragraph reasoning
    pub summary: String,
    /// Source URLs the reasoning leaned on
    #[serde(default)]
    pub citations: Vec<String>,
    /// Actual dollars this call cost
    pub cost: Decimal,
}

/// Per-million-token pricing for one model
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input_per_million: Decimal,
    pub output_per_million: Decimal,
}

const MILLION: Decimal = dec!(1000000);

impl ModelPricing {
    /// gpt-4o-mini, the scan tier default
    pub fn scan_default() -> Self {
        Self {
            input_per_million: dec!(0.15),
            output_per_million: dec!(0.60),
        }
    }

    /// gpt-4o, the deep tier default
    pub fn deep_default() -> Self {
        Self {
            input_per_million: dec!(2.50),
            output_per_million: dec!(10.00),
        }
    }

    /// Dollar cost of a completed call
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> Decimal {
        Decimal::from(prompt_tokens) * self.input_per_million / MILLION
            + Decimal::from(completion_tokens) * self.output_per_million / MILLION
    }

    /// Completion-token allowance that keeps a call under `max_cost`,
    /// clamped to a workable range
    pub fn completion_tokens_for_budget(&self, max_cost: Decimal) -> u32 {
        use rust_decimal::prelude::ToPrimitive;

        if self.output_per_million <= Decimal::ZERO {
            return 4000;
        }
        let tokens = (max_cost * MILLION / self.output_per_million)
            .to_u32()
            .unwrap_or(4000);
        tokens.clamp(256, 4000)
    }
}
