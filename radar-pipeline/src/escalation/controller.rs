//! The escalation controller
//!
//! Runs the cheap-scan / conditional-deep-dive state machine over a
//! volume-ranked, cooldown-filtered candidate list, charging every tier's
//! actual cost to a per-run spend ledger. Candidates are processed strictly
//! sequentially so the ledger's check-then-charge stays atomic, and
//! candidate order (volume descending) is the fairness policy once the
//! ceiling starts skipping markets.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, instrument, warn};

use radar_core::{Edge, Market, PipelineStage, RadarError, RadarResult, RunError};

use super::analyst::{Analysis, MarketAnalyst};
use super::cooldown::CooldownStore;
use super::ledger::SpendLedger;
use super::tools::ResearchTools;

/// Escalation policy knobs, read once at startup
#[derive(Debug, Clone)]
pub struct EscalationConfig {
    /// Minimum market volume to qualify as a candidate
    pub min_volume: Decimal,
    /// Minutes a market stays ineligible after any analysis attempt
    pub cooldown_minutes: i64,
    /// Hard cap on candidates per run
    pub max_markets_per_run: usize,
    /// Dollar ceiling for the whole run
    pub per_run_budget: Decimal,
    /// Per-call cap for the initial scan tier
    pub scan_budget: Decimal,
    /// Per-call cap for the deep analysis tier
    pub deep_budget: Decimal,
    /// Scan edges below this are rejected without escalation
    pub min_edge: Decimal,
    /// Scan edges at or above this trigger the deep tier
    pub escalate_threshold: Decimal,
    pub scan_timeout: Duration,
    pub deep_timeout: Duration,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        let scan_timeout = Duration::from_secs(60);
        Self {
            min_volume: dec!(10000),
            cooldown_minutes: 30,
            max_markets_per_run: 5,
            per_run_budget: dec!(2.00),
            scan_budget: dec!(0.30),
            deep_budget: dec!(1.00),
            min_edge: dec!(0.05),
            escalate_threshold: dec!(0.10),
            scan_timeout,
            deep_timeout: scan_timeout * 2,
        }
    }
}

/// What one escalation pass produced
#[derive(Debug, Default)]
pub struct EscalationOutcome {
    pub edges: Vec<Edge>,
    pub errors: Vec<RunError>,
    /// Dollars actually charged to the ledger
    pub spent: Decimal,
    /// Candidates whose scan tier was invoked
    pub analyzed: usize,
    /// Candidates skipped because the ledger could not cover another scan
    pub skipped_budget: usize,
}

/// Budget-gated two-tier analysis over high-value markets
pub struct EscalationController {
    analyst: Arc<dyn MarketAnalyst>,
    cooldowns: Arc<dyn CooldownStore>,
    config: EscalationConfig,
}

impl EscalationController {
    pub fn new(
        analyst: Arc<dyn MarketAnalyst>,
        cooldowns: Arc<dyn CooldownStore>,
        config: EscalationConfig,
    ) -> Self {
        Self {
            analyst,
            cooldowns,
            config,
        }
    }

    /// Priority candidates: volume above the floor, outside their cooldown
    /// window, volume descending, capped per run
    pub fn select_candidates(&self, markets: &[Market], now: DateTime<Utc>) -> Vec<Market> {
        let cooldown = chrono::Duration::minutes(self.config.cooldown_minutes);
        let mut candidates: Vec<Market> = markets
            .iter()
            .filter(|m| m.volume_or_zero() >= self.config.min_volume)
            .filter(|m| match self.cooldowns.last_analyzed(&m.id) {
                Some(last) => now.signed_duration_since(last) >= cooldown,
                None => true,
            })
            .cloned()
            .collect();

        candidates.sort_by(|a, b| {
            b.volume_or_zero()
                .cmp(&a.volume_or_zero())
                .then_with(|| a.id.cmp(&b.id))
        });
        candidates.truncate(self.config.max_markets_per_run);
        candidates
    }

    /// Run the two-tier analysis over this run's market universe
    #[instrument(skip(self, tools))]
    pub async fn run(&self, tools: &ResearchTools) -> EscalationOutcome {
        let candidates = self.select_candidates(tools.markets(), Utc::now());
        let mut ledger = SpendLedger::new(self.config.per_run_budget);
        let mut outcome = EscalationOutcome::default();

        debug!("Escalation pass over {} candidates", candidates.len());

        for (index, market) in candidates.iter().enumerate() {
            if !ledger.can_afford(self.config.scan_budget) {
                // Skipped candidates carry no cooldown mark; they compete
                // again next run.
                outcome.skipped_budget = candidates.len() - index;
                info!(
                    "Budget ceiling reached (${} spent); skipping {} candidates",
                    ledger.spent(),
                    outcome.skipped_budget
                );
                break;
            }

            let scan = self
                .run_tier(
                    self.analyst
                        .initial_scan(market, tools, self.config.scan_budget),
                    self.config.scan_timeout,
                )
                .await;
            // Analyzed-or-failed, the market enters cooldown so a failing
            // market is not retried every run.
            self.cooldowns.mark_analyzed(&market.id, Utc::now());
            outcome.analyzed += 1;

            let mut analysis = match scan {
                Ok(a) => {
                    ledger.charge(a.cost);
                    a
                }
                Err(e) => {
                    warn!("Initial scan failed for {}: {}", market.id, e);
                    outcome
                        .errors
                        .push(RunError::new(PipelineStage::Escalation, market.id.clone(), e));
                    continue;
                }
            };

            if analysis.edge < self.config.min_edge {
                debug!(
                    "No usable signal for {} (edge {} below minimum)",
                    market.id, analysis.edge
                );
                continue;
            }

            if analysis.edge >= self.config.escalate_threshold
                && ledger.can_afford(self.config.deep_budget)
            {
                match self
                    .run_tier(
                        self.analyst
                            .deep_analysis(market, &analysis, tools, self.config.deep_budget),
                        self.config.deep_timeout,
                    )
                    .await
                {
                    Ok(deep) => {
                        ledger.charge(deep.cost);
                        analysis = deep;
                    }
                    Err(e) => {
                        // Fall back to the initial scan's result
                        warn!("Deep analysis failed for {}: {}", market.id, e);
                        outcome
                            .errors
                            .push(RunError::new(PipelineStage::Escalation, market.id.clone(), e));
                    }
                }
            }

            if analysis.edge >= self.config.min_edge {
                outcome.edges.push(analysis.into_edge(market.clone()));
            }
        }

        outcome.spent = ledger.spent();
        info!(
            "Escalation done: {} analyzed, {} edges, ${} spent",
            outcome.analyzed,
            outcome.edges.len(),
            outcome.spent
        );
        outcome
    }

    /// Bound a tier to its deadline. Dropping the timed-out future cancels
    /// the in-flight call, so a hung provider cannot starve the budget
    /// check for the remaining candidates.
    async fn run_tier(
        &self,
        tier: impl Future<Output = RadarResult<Analysis>>,
        deadline: Duration,
    ) -> RadarResult<Analysis> {
        match tokio::time::timeout(deadline, tier).await {
            Ok(result) => result,
            Err(_) => Err(RadarError::timeout(deadline.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use radar_core::{Direction, Platform};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cache::SourceCache;
    use crate::data::SourceData;
    use crate::escalation::cooldown::MemoryCooldownStore;
    use crate::registry::PipelineRegistry;

    fn market(id: &str, volume: Decimal) -> Market {
        Market {
            platform: Platform::Kalshi,
            id: id.to_string(),
            ticker: None,
            title: format!("Market {}", id),
            category: None,
            price: dec!(0.50),
            volume: Some(volume),
            liquidity: None,
            close_time: None,
            url: None,
        }
    }

    fn tools(markets: Vec<Market>) -> ResearchTools {
        ResearchTools::new(
            Arc::new(SourceData::new()),
            Arc::new(markets),
            Arc::new(PipelineRegistry::new()),
            Arc::new(SourceCache::new()),
        )
    }

    fn analysis(edge: Decimal, cost: Decimal, summary: &str) -> Analysis {
        Analysis {
            direction: Direction::Yes,
            edge,
            confidence: dec!(0.7),
            fair_value: None,
            summary: summary.to_string(),
            citations: vec![],
            cost,
        }
    }

    /// What the stub's deep tier should do
    #[derive(Clone, Copy)]
    enum DeepBehavior {
        Succeed,
        Hang,
        Fail,
    }

    struct StubAnalyst {
        scan_edge: Decimal,
        scan_cost: Decimal,
        deep: DeepBehavior,
        scans: AtomicUsize,
        deeps: AtomicUsize,
    }

    impl StubAnalyst {
        fn new(scan_edge: Decimal, scan_cost: Decimal, deep: DeepBehavior) -> Self {
            Self {
                scan_edge,
                scan_cost,
                deep,
                scans: AtomicUsize::new(0),
                deeps: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketAnalyst for StubAnalyst {
        async fn initial_scan(
            &self,
            _market: &Market,
            _tools: &ResearchTools,
            _max_cost: Decimal,
        ) -> RadarResult<Analysis> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(analysis(self.scan_edge, self.scan_cost, "initial scan"))
        }

        async fn deep_analysis(
            &self,
            _market: &Market,
            _initial: &Analysis,
            _tools: &ResearchTools,
            _max_cost: Decimal,
        ) -> RadarResult<Analysis> {
            self.deeps.fetch_add(1, Ordering::SeqCst);
            match self.deep {
                DeepBehavior::Succeed => Ok(analysis(dec!(0.22), dec!(0.50), "deep analysis")),
                DeepBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("hung tier should have been cancelled")
                }
                DeepBehavior::Fail => Err(RadarError::api("deep tier rejected")),
            }
        }
    }

    struct HangingScanAnalyst;

    #[async_trait]
    impl MarketAnalyst for HangingScanAnalyst {
        async fn initial_scan(
            &self,
            _market: &Market,
            _tools: &ResearchTools,
            _max_cost: Decimal,
        ) -> RadarResult<Analysis> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("hung tier should have been cancelled")
        }

        async fn deep_analysis(
            &self,
            _market: &Market,
            _initial: &Analysis,
            _tools: &ResearchTools,
            _max_cost: Decimal,
        ) -> RadarResult<Analysis> {
            unreachable!("scan never succeeds")
        }
    }

    fn config() -> EscalationConfig {
        EscalationConfig {
            min_volume: dec!(1000),
            cooldown_minutes: 30,
            max_markets_per_run: 5,
            per_run_budget: dec!(1.00),
            scan_budget: dec!(0.30),
            deep_budget: dec!(0.30),
            min_edge: dec!(0.05),
            escalate_threshold: dec!(0.10),
            scan_timeout: Duration::from_secs(60),
            deep_timeout: Duration::from_secs(120),
        }
    }

    fn controller_with(
        analyst: Arc<dyn MarketAnalyst>,
        cooldowns: Arc<dyn CooldownStore>,
        config: EscalationConfig,
    ) -> EscalationController {
        EscalationController::new(analyst, cooldowns, config)
    }

    #[tokio::test]
    async fn budget_ceiling_bounds_analyzed_candidates() {
        // Scan below min_edge so no deep tier runs; each scan costs $0.30
        // against a $1.00 ceiling with a $0.30 per-call cap.
        let analyst = Arc::new(StubAnalyst::new(
            dec!(0.01),
            dec!(0.30),
            DeepBehavior::Succeed,
        ));
        let cooldowns = Arc::new(MemoryCooldownStore::new());
        let controller = controller_with(analyst.clone(), cooldowns.clone(), config());

        let markets: Vec<Market> = (0..5)
            .map(|i| market(&format!("m{}", i), dec!(50000)))
            .collect();
        let tools = tools(markets);

        let outcome = controller.run(&tools).await;
        assert_eq!(outcome.analyzed, 3);
        assert_eq!(outcome.skipped_budget, 2);
        assert_eq!(outcome.spent, dec!(0.90));
        // Skipped candidates carry no cooldown mark
        assert_eq!(cooldowns.len(), 3);
    }

    #[tokio::test]
    async fn candidates_are_volume_descending_and_capped() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.01), dec!(0.01), DeepBehavior::Succeed));
        let mut cfg = config();
        cfg.max_markets_per_run = 2;
        let controller = controller_with(analyst, Arc::new(MemoryCooldownStore::new()), cfg);

        let markets = vec![
            market("small", dec!(2000)),
            market("big", dec!(90000)),
            market("mid", dec!(40000)),
            market("dust", dec!(10)),
        ];
        let candidates = controller.select_candidates(&markets, Utc::now());

        let ids: Vec<&str> = candidates.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "mid"]);
    }

    #[tokio::test]
    async fn cooldown_excludes_recently_analyzed_markets() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.01), dec!(0.01), DeepBehavior::Succeed));
        let cooldowns = Arc::new(MemoryCooldownStore::new());
        let controller = controller_with(analyst, cooldowns.clone(), config());

        let now = Utc::now();
        cooldowns.mark_analyzed("m1", now - chrono::Duration::minutes(29));
        cooldowns.mark_analyzed("m2", now - chrono::Duration::minutes(31));

        let markets = vec![market("m1", dec!(50000)), market("m2", dec!(50000))];
        let candidates = controller.select_candidates(&markets, now);

        let ids: Vec<&str> = candidates.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2"]);
    }

    #[tokio::test]
    async fn scan_below_minimum_does_not_escalate() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.02), dec!(0.05), DeepBehavior::Succeed));
        let controller =
            controller_with(analyst.clone(), Arc::new(MemoryCooldownStore::new()), config());
        let tools = tools(vec![market("m1", dec!(50000))]);

        let outcome = controller.run(&tools).await;
        assert!(outcome.edges.is_empty());
        assert_eq!(analyst.deeps.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.analyzed, 1);
    }

    #[tokio::test]
    async fn scan_above_threshold_escalates_and_deep_wins() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.12), dec!(0.10), DeepBehavior::Succeed));
        let controller =
            controller_with(analyst.clone(), Arc::new(MemoryCooldownStore::new()), config());
        let tools = tools(vec![market("m1", dec!(50000))]);

        let outcome = controller.run(&tools).await;
        assert_eq!(analyst.deeps.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.edges[0].edge, dec!(0.22));
        assert_eq!(outcome.edges[0].reason, "deep analysis");
        assert_eq!(outcome.spent, dec!(0.60));
    }

    #[tokio::test(start_paused = true)]
    async fn deep_timeout_falls_back_to_initial_scan() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.12), dec!(0.10), DeepBehavior::Hang));
        let controller =
            controller_with(analyst, Arc::new(MemoryCooldownStore::new()), config());
        let tools = tools(vec![market("m1", dec!(50000))]);

        let outcome = controller.run(&tools).await;
        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.edges[0].reason, "initial scan");
        assert_eq!(outcome.edges[0].edge, dec!(0.12));
        assert_eq!(outcome.errors.len(), 1);
        // Only the scan's cost was charged
        assert_eq!(outcome.spent, dec!(0.10));
    }

    #[tokio::test]
    async fn deep_error_falls_back_to_initial_scan() {
        let analyst = Arc::new(StubAnalyst::new(dec!(0.12), dec!(0.10), DeepBehavior::Fail));
        let controller =
            controller_with(analyst, Arc::new(MemoryCooldownStore::new()), config());
        let tools = tools(vec![market("m1", dec!(50000))]);

        let outcome = controller.run(&tools).await;
        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.edges[0].reason, "initial scan");
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn scan_timeout_skips_market_but_marks_cooldown() {
        let cooldowns = Arc::new(MemoryCooldownStore::new());
        let controller =
            controller_with(Arc::new(HangingScanAnalyst), cooldowns.clone(), config());
        let tools = tools(vec![market("m1", dec!(50000))]);

        let outcome = controller.run(&tools).await;
        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.analyzed, 1);
        assert_eq!(outcome.spent, Decimal::ZERO);
        // Failed analysis still respects cooldown, no hot-looping
        assert!(cooldowns.last_analyzed("m1").is_some());
    }
}
