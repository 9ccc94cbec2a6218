//! Per-run spend ledger

use rust_decimal::Decimal;

/// Tracks dollars spent on analysis within a single run.
///
/// Created fresh at the start of every run; never shared across runs. The
/// controller processes candidates sequentially, so a check followed by a
/// charge is atomic per candidate.
#[derive(Debug)]
pub struct SpendLedger {
    ceiling: Decimal,
    spent: Decimal,
}

impl SpendLedger {
    pub fn new(ceiling: Decimal) -> Self {
        Self {
            ceiling,
            spent: Decimal::ZERO,
        }
    }

    /// Whether a call capped at `max_cost` fits under the ceiling
    pub fn can_afford(&self, max_cost: Decimal) -> bool {
        self.spent + max_cost <= self.ceiling
    }

    /// Record actual spend. Callers charge the real cost, which may be less
    /// than the cap they reserved against.
    pub fn charge(&mut self, cost: Decimal) {
        self.spent += cost;
    }

    pub fn spent(&self) -> Decimal {
        self.spent
    }

    pub fn remaining(&self) -> Decimal {
        (self.ceiling - self.spent).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn affordability_reserves_the_call_cap() {
        let mut ledger = SpendLedger::new(dec!(1.00));

        assert!(ledger.can_afford(dec!(0.30)));
        ledger.charge(dec!(0.30));
        ledger.charge(dec!(0.30));
        ledger.charge(dec!(0.30));

        // 0.90 spent: another 0.30 call would break the ceiling
        assert!(!ledger.can_afford(dec!(0.30)));
        assert!(ledger.can_afford(dec!(0.10)));
        assert_eq!(ledger.remaining(), dec!(0.10));
    }

    #[test]
    fn remaining_never_goes_negative() {
        let mut ledger = SpendLedger::new(dec!(0.50));
        ledger.charge(dec!(0.80));
        assert_eq!(ledger.remaining(), Decimal::ZERO);
        assert!(!ledger.can_afford(dec!(0.01)));
    }
}
