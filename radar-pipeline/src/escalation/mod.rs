//! Budget-constrained two-tier escalation
//!
//! For a small, pre-filtered set of high-value markets the pipeline can
//! invoke a second, materially more expensive analysis step. This module
//! bounds that spend with a per-run ledger, avoids redundant work with a
//! cooldown store, and binds every external call to a cancelling timeout.

pub mod analyst;
pub mod controller;
pub mod cooldown;
pub mod ledger;
pub mod tools;

pub use analyst::{Analysis, LlmAnalyst, MarketAnalyst};
pub use controller::{EscalationConfig, EscalationController, EscalationOutcome};
pub use cooldown::{CooldownStore, CooldownStoreError, MemoryCooldownStore, SqliteCooldownStore};
pub use ledger::SpendLedger;
pub use tools::{NewsMention, ResearchTools};
