//! Central bank
//!
//! Regulator and lender of last resort. It may learn its own minimum
//! capital-adequacy ratio, forces undercapitalized banks to deleverage,
//! runs the discount window, and applies the too-big-to-fail bailout and
//! the insolvency punishments at the end of every cycle.

use crate::core::identity::AgentId;
use crate::orchestrator::config::{CapitalRules, ModelConfig};
use crate::rng::RngManager;
use crate::strategy::{CentralBankStrategy, StrategyPool, BANK_ATTRACTION_DECAY};
use serde::{Deserialize, Serialize};

use super::bank::{Bank, LiquidationOutcome};
use super::CycleAgent;

/// Share of the loan book written off when a bank is found insolvent
const INSOLVENCY_PENALTY: f64 = 0.5;

/// Liquidity and capital injected by a too-big-to-fail bailout
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bailout {
    pub liquidity: f64,
    pub capital: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralBank {
    id: AgentId,
    lending_interest_rate: f64,
    offers_discount_window: bool,
    too_big_to_fail_active: bool,
    minimum_capital_ratio: f64,
    insolvency_counter: usize,
    contagion_insolvency_counter: usize,
    strategy: Option<StrategyPool<CentralBankStrategy>>,
    last_utility: f64,
}

impl CentralBank {
    pub fn new(id: AgentId, config: &ModelConfig) -> Self {
        let is_learning = !config.is_central_bank_zero_intelligence_agent;
        Self {
            id,
            lending_interest_rate: config.central_bank_lending_interest_rate,
            offers_discount_window: config.offers_discount_window_lending,
            too_big_to_fail_active: config.is_too_big_to_fail_policy_active,
            minimum_capital_ratio: config.minimum_capital_adequacy_ratio,
            insolvency_counter: 0,
            contagion_insolvency_counter: 0,
            strategy: is_learning.then(|| StrategyPool::new(BANK_ATTRACTION_DECAY)),
            last_utility: 0.0,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn lending_interest_rate(&self) -> f64 {
        self.lending_interest_rate
    }

    pub fn minimum_capital_ratio(&self) -> f64 {
        self.minimum_capital_ratio
    }

    pub fn insolvency_counter(&self) -> usize {
        self.insolvency_counter
    }

    pub fn contagion_insolvency_counter(&self) -> usize {
        self.contagion_insolvency_counter
    }

    pub fn strategy(&self) -> Option<&StrategyPool<CentralBankStrategy>> {
        self.strategy.as_ref()
    }

    pub fn last_utility(&self) -> f64 {
        self.last_utility
    }

    /// Learning step: pick this cycle's regulatory minimum
    pub fn choose_policy(&mut self, rng: &mut RngManager) -> Option<f64> {
        let pool = self.strategy.as_mut()?;
        pool.update_probabilities();
        self.minimum_capital_ratio = pool.select(rng).minimum_capital_ratio;
        Some(self.minimum_capital_ratio)
    }

    /// Force every bank under the minimum to shrink its loan book
    ///
    /// Returns `(ledger index, factor)` for each bank adjusted.
    pub fn observe_banks_capital_adequacy(
        &self,
        banks: &mut [Bank],
        rules: &CapitalRules,
    ) -> Vec<(usize, f64)> {
        let mut adjusted = Vec::new();
        for bank in banks.iter_mut() {
            if bank.capital_adequacy_ratio(rules) < self.minimum_capital_ratio {
                if let Some(factor) = bank.adjust_capital_ratio(self.minimum_capital_ratio, rules) {
                    adjusted.push((bank.index(), factor));
                }
            }
        }
        adjusted
    }

    /// Too-big-to-fail lottery: larger banks are more likely to win
    ///
    /// Draws only while the policy is active.
    pub fn is_too_big_to_fail(&self, bank: &Bank, rng: &mut RngManager) -> bool {
        self.too_big_to_fail_active && rng.next_f64() < 2.0 * bank.market_share()
    }

    /// Discount-window loan the bank is granted (non-positive)
    pub fn discount_window_loan(&self, bank: &Bank, rng: &mut RngManager) -> f64 {
        if !self.offers_discount_window {
            return 0.0;
        }
        if self.too_big_to_fail_active && !self.is_too_big_to_fail(bank, rng) {
            return 0.0;
        }
        bank.liquidity_needs().min(0.0)
    }

    /// Lend to every still-illiquid bank
    ///
    /// Returns `(ledger index, amount)` for each loan booked.
    pub fn organize_discount_window_lending(
        &self,
        banks: &mut [Bank],
        rng: &mut RngManager,
    ) -> Vec<(usize, f64)> {
        let mut loans = Vec::new();
        if !self.offers_discount_window {
            return loans;
        }
        for bank in banks.iter_mut() {
            if bank.is_liquid() {
                continue;
            }
            let amount = self.discount_window_loan(bank, rng);
            bank.receive_discount_window_loan(amount);
            if amount != 0.0 {
                loans.push((bank.index(), amount));
            }
        }
        loans
    }

    /// Make still-illiquid banks fire-sell loans
    pub fn make_banks_sell_non_liquid_assets(
        banks: &mut [Bank],
        discount_rate: f64,
    ) -> Vec<(usize, f64)> {
        banks
            .iter_mut()
            .filter(|bank| !bank.is_liquid())
            .map(|bank| (bank.index(), bank.use_non_liquid_assets_to_pay_depositors_back(discount_rate)))
            .filter(|(_, sold)| *sold > 0.0)
            .collect()
    }

    /// Cover the bank's remaining deficit and any capital hole
    pub fn bailout(bank: &mut Bank) -> Bailout {
        let mut injected = Bailout::default();
        if !bank.is_liquid() {
            injected.liquidity = -bank.liquidity_needs();
            bank.sheet_mut().liquid_assets += injected.liquidity;
            bank.set_liquidity_needs(0.0);
        }
        if bank.is_insolvent() {
            injected.capital = bank.balance_sheet().capital();
            bank.sheet_mut().liquid_assets += injected.capital;
        }
        injected
    }

    pub fn punish_illiquidity(bank: &mut Bank, discount_rate: f64) -> f64 {
        bank.use_non_liquid_assets_to_pay_depositors_back(discount_rate)
    }

    pub fn punish_insolvency(&mut self, bank: &mut Bank) {
        bank.sheet_mut().non_financial_sector_loan *= 1.0 - INSOLVENCY_PENALTY;
        self.insolvency_counter += 1;
    }

    pub fn punish_contagion_insolvency(&mut self, bank: &mut Bank) {
        self.contagion_insolvency_counter += 1;
        self.punish_insolvency(bank);
    }

    pub fn total_real_sector_loans(banks: &[Bank]) -> f64 {
        banks
            .iter()
            .map(|bank| bank.balance_sheet().non_financial_sector_loan)
            .sum()
    }

    /// Utility: average lending minus a heavy insolvency penalty
    pub fn calculate_final_utility(&mut self, banks: &[Bank]) -> f64 {
        let potential_total_size = banks.len() as f64;
        let utility = if potential_total_size == 0.0 {
            0.0
        } else {
            Self::total_real_sector_loans(banks) / potential_total_size
                - potential_total_size * self.insolvency_counter as f64
        };
        self.last_utility = utility;
        if let Some(pool) = &mut self.strategy {
            pool.record_profit(utility);
        }
        utility
    }

    /// Resolve every bank still insolvent at cycle end
    pub fn liquidate_insolvent_banks(banks: &mut [Bank]) -> Vec<(usize, LiquidationOutcome)> {
        banks
            .iter_mut()
            .filter(|bank| bank.is_insolvent())
            .map(|bank| (bank.index(), bank.liquidate()))
            .collect()
    }
}

impl CycleAgent for CentralBank {
    fn reset_cycle(&mut self) {
        self.insolvency_counter = 0;
        self.contagion_insolvency_counter = 0;
    }
}
