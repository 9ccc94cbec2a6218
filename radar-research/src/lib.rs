//! LLM analysis tiers for the Prediction Market Edge Radar
//!
//! Wraps OpenAI chat completions into the two calls the escalation
//! controller pays for: a cheap market scan and an expensive deep dive.
//! Every call reports its actual dollar cost, derived from token usage,
//! so the caller can charge a spend ledger.

pub mod client;
pub mod types;

pub use client::ResearchClient;
pub use types::{Assessment, ModelPricing};
