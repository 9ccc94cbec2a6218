//! Polling scheduler
//!
//! Drives the orchestrator on a fixed cadence with exactly one run in
//! flight: the loop awaits each run before the next tick, and ticks that
//! fire while a slow run is still executing are skipped, not queued.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use radar_core::RunResult;
use radar_pipeline::Orchestrator;

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run forever on the configured cadence. The first pass starts
    /// immediately.
    pub async fn run(&self, orchestrator: &Orchestrator) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let result = orchestrator.run().await;
            log_summary(&result);
        }
    }
}

fn log_summary(result: &RunResult) {
    for ranked in result.edges.iter().take(5) {
        info!(
            "[{}] ({}) {} {} edge {} conf {}: {}",
            ranked.severity,
            ranked.edge.signal.family(),
            ranked.edge.market.title,
            ranked.edge.direction,
            ranked.edge.edge,
            ranked.edge.confidence,
            ranked.edge.reason,
        );
    }
    if result.has_errors() {
        for error in &result.errors {
            info!("degraded {}: {} ({})", error.stage, error.source, error.error);
        }
    }
}
