//! Depositor
//!
//! A household holding one deposit at one bank. In period 1 it may
//! withdraw early (liquidity shock); whatever is left at the end of the
//! cycle is its final withdrawal. Learning depositors choose a safety
//! threshold and run only when their bank's capital-adequacy ratio falls
//! to or below it.

use crate::core::identity::AgentId;
use crate::rng::RngManager;
use crate::strategy::{DepositorStrategy, StrategyPool, DEPOSITOR_ATTRACTION_DECAY};
use serde::{Deserialize, Serialize};

use super::CycleAgent;

/// Consumption ratios are floored here before taking the log
const MIN_CONSUMPTION_RATIO: f64 = 1e-6;

/// Deposit balance and the depositor's last withdrawal fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub amount: f64,
    pub last_percentage_withdrawn: f64,
}

/// Inputs to a depositor's withdrawal decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShockParams {
    /// Fraction withdrawn when the depositor runs
    pub amount_withdrawn: f64,
    /// Probability a zero-intelligence depositor runs
    pub probability_of_withdrawal: f64,
}

/// Outcome of a depositor's end-of-cycle accounting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositorOutcome {
    pub final_consumption: f64,
    /// Profit signal: 100 · ln(consumption / initial deposit)
    pub profit: f64,
    /// Consumption fell short and nothing made the depositor whole
    pub suffered_loss: bool,
}

/// A household with a single deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depositor {
    id: AgentId,
    initial_deposit: Deposit,
    deposit: Deposit,
    amount_early_withdraw: f64,
    amount_final_withdraw: f64,
    safety_threshold: f64,
    /// Cycles in which this depositor ended short
    insolvency_counter: usize,
    strategy: Option<StrategyPool<DepositorStrategy>>,
}

impl Depositor {
    pub fn new(id: AgentId, is_learning: bool) -> Self {
        Self {
            id,
            initial_deposit: Deposit::default(),
            deposit: Deposit::default(),
            amount_early_withdraw: 0.0,
            amount_final_withdraw: 0.0,
            safety_threshold: 0.0,
            insolvency_counter: 0,
            strategy: is_learning.then(|| StrategyPool::new(DEPOSITOR_ATTRACTION_DECAY)),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn is_learning(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn strategy(&self) -> Option<&StrategyPool<DepositorStrategy>> {
        self.strategy.as_ref()
    }

    pub fn deposit(&self) -> &Deposit {
        &self.deposit
    }

    pub fn initial_deposit(&self) -> f64 {
        self.initial_deposit.amount
    }

    pub fn amount_early_withdraw(&self) -> f64 {
        self.amount_early_withdraw
    }

    pub fn amount_final_withdraw(&self) -> f64 {
        self.amount_final_withdraw
    }

    pub fn safety_threshold(&self) -> f64 {
        self.safety_threshold
    }

    pub fn insolvency_counter(&self) -> usize {
        self.insolvency_counter
    }

    /// Learning step: update the menu and pick this cycle's threshold
    pub fn choose_strategy(&mut self, rng: &mut RngManager) {
        if let Some(pool) = &mut self.strategy {
            pool.update_probabilities();
            self.safety_threshold = pool.select(rng).safety_threshold;
        }
    }

    /// Open this cycle's deposit
    pub fn make_deposit(&mut self, amount: f64) {
        self.initial_deposit.amount = amount;
        self.deposit = Deposit {
            amount,
            last_percentage_withdrawn: self.deposit.last_percentage_withdrawn,
        };
    }

    /// Fraction of the deposit this depositor wants back early
    ///
    /// Learning depositors compare the bank's capital-adequacy ratio with
    /// their threshold; zero-intelligence depositors run at random.
    pub fn draw_shock(&self, bank_car: f64, params: ShockParams, rng: &mut RngManager) -> f64 {
        if self.is_learning() {
            if bank_car > self.safety_threshold {
                0.0
            } else {
                params.amount_withdrawn
            }
        } else if rng.next_f64() < params.probability_of_withdrawal {
            params.amount_withdrawn
        } else {
            0.0
        }
    }

    /// Withdraw `shock` of the current deposit and return the amount
    pub fn withdraw(&mut self, shock: f64) -> f64 {
        self.deposit.last_percentage_withdrawn = shock;
        let amount = self.deposit.amount * shock;
        self.deposit.amount -= amount;
        self.amount_early_withdraw = amount;
        amount
    }

    pub fn accrue_interest(&mut self, factor: f64) {
        self.deposit.amount *= factor;
    }

    /// Scale the deposit during the bank's liquidation
    pub fn scale_deposit(&mut self, factor: f64) {
        self.deposit.amount *= factor;
    }

    /// Close the cycle: compute consumption and feed the profit signal back
    pub fn settle_final_utility(
        &mut self,
        deposit_insurance: bool,
        deposit_interest_rate: f64,
    ) -> DepositorOutcome {
        self.amount_final_withdraw = self.deposit.amount;
        let initial = self.initial_deposit.amount;
        let mut final_consumption = self.amount_early_withdraw + self.amount_final_withdraw;
        let mut suffered_loss = false;

        if final_consumption < initial {
            if deposit_insurance {
                final_consumption = initial * (1.0 + deposit_interest_rate);
            } else {
                suffered_loss = true;
                self.insolvency_counter += 1;
            }
        }

        let profit = if initial > 0.0 {
            100.0 * (final_consumption / initial).max(MIN_CONSUMPTION_RATIO).ln()
        } else {
            0.0
        };

        if let Some(pool) = &mut self.strategy {
            pool.record_profit(profit);
        }

        DepositorOutcome {
            final_consumption,
            profit,
            suffered_loss,
        }
    }
}

impl CycleAgent for Depositor {
    fn reset_cycle(&mut self) {
        self.amount_early_withdraw = 0.0;
        self.amount_final_withdraw = 0.0;
        self.deposit = Deposit {
            amount: self.initial_deposit.amount,
            last_percentage_withdrawn: self.deposit.last_percentage_withdrawn,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::IdentityIssuer;

    const PARAMS: ShockParams = ShockParams {
        amount_withdrawn: 1.0,
        probability_of_withdrawal: 0.15,
    };

    #[test]
    fn test_learning_depositor_runs_below_threshold() {
        let mut ids = IdentityIssuer::new();
        let mut d = Depositor::new(ids.issue(), true);
        let mut rng = RngManager::new(1);
        d.choose_strategy(&mut rng);
        let threshold = d.safety_threshold();
        assert!(threshold > 0.0);

        assert_eq!(d.draw_shock(threshold + 0.01, PARAMS, &mut rng), 0.0);
        assert_eq!(d.draw_shock(threshold, PARAMS, &mut rng), 1.0);
    }

    #[test]
    fn test_make_deposit_keeps_last_withdrawal_fraction() {
        let mut ids = IdentityIssuer::new();
        let mut d = Depositor::new(ids.issue(), false);
        d.make_deposit(10.0);
        d.withdraw(0.5);
        d.make_deposit(20.0);
        assert_eq!(d.deposit().amount, 20.0);
        assert_eq!(d.deposit().last_percentage_withdrawn, 0.5);
    }

    #[test]
    fn test_zero_initial_deposit_gives_zero_profit() {
        let mut ids = IdentityIssuer::new();
        let mut d = Depositor::new(ids.issue(), true);
        let outcome = d.settle_final_utility(false, 0.005);
        assert_eq!(outcome.profit, 0.0);
        assert!(!outcome.suffered_loss);
    }
}
