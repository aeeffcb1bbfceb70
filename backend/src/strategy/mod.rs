//! Adaptive strategy selection (EWA)
//!
//! Banks, depositors and the central bank each pick one option per cycle
//! from a fixed menu. Options that paid off in the past become more
//! likely to be picked again.
//!
//! # Update rule
//!
//! Once per cycle, before selecting:
//!
//! ```text
//! A_i ← decay · A_i + profit_i
//! P_i ← exp(A_i) / Σ exp(A)
//! F_i ← P_1 + … + P_i
//! ```
//!
//! Selection draws `u ∈ [0, 1)` and takes the first option (menu order)
//! whose `F` exceeds `u`. The realized profit of the chosen option is
//! written back at the end of the cycle and feeds the next update. Each
//! option keeps its last realized profit until it is chosen again.

mod menus;

pub use menus::{BankStrategy, CentralBankStrategy, DepositorStrategy};

use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Attractiveness decay applied by banks and the central bank
pub const BANK_ATTRACTION_DECAY: f64 = 0.9999;

/// Depositors accumulate attractiveness without decay
pub const DEPOSITOR_ATTRACTION_DECAY: f64 = 1.0;

/// A discrete parameterization an agent can choose
pub trait StrategyOption: Clone + std::fmt::Debug {
    /// The full menu, in selection order
    fn menu() -> Vec<Self>;
}

/// One menu entry with its learning state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry<S> {
    pub option: S,
    /// Running attractiveness `A`
    pub attractiveness: f64,
    /// Selection probability `P`
    pub probability: f64,
    /// Cumulative probability `F`
    pub cumulative: f64,
    /// Last realized profit signal of this option
    pub last_profit: f64,
}

/// Fixed menu of options plus the EWA learning state
///
/// # Example
/// ```
/// use banksim_core::strategy::{DepositorStrategy, StrategyPool, DEPOSITOR_ATTRACTION_DECAY};
/// use banksim_core::RngManager;
///
/// let mut pool = StrategyPool::<DepositorStrategy>::new(DEPOSITOR_ATTRACTION_DECAY);
/// let mut rng = RngManager::new(1);
///
/// pool.update_probabilities();
/// let chosen = pool.select(&mut rng).clone();
/// pool.record_profit(2.5);
/// assert_eq!(pool.chosen(), Some(&chosen));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPool<S> {
    entries: Vec<StrategyEntry<S>>,
    chosen: Option<usize>,
    decay: f64,
}

impl<S: StrategyOption> StrategyPool<S> {
    /// Pool over the option type's full menu
    pub fn new(decay: f64) -> Self {
        Self::from_options(S::menu(), decay)
    }

    /// Pool over an explicit menu
    ///
    /// # Panics
    /// Panics if the menu is empty
    pub fn from_options(options: Vec<S>, decay: f64) -> Self {
        assert!(!options.is_empty(), "strategy menu must not be empty");
        let entries = options
            .into_iter()
            .map(|option| StrategyEntry {
                option,
                attractiveness: 0.0,
                probability: 0.0,
                cumulative: 0.0,
                last_profit: 0.0,
            })
            .collect();
        Self {
            entries,
            chosen: None,
            decay,
        }
    }

    /// Recompute `A`, `P` and `F` over the whole menu
    pub fn update_probabilities(&mut self) {
        for entry in &mut self.entries {
            entry.attractiveness = self.decay * entry.attractiveness + entry.last_profit;
        }

        // Shift by the max before exponentiating; P is unchanged
        let max_a = self
            .entries
            .iter()
            .map(|e| e.attractiveness)
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = self
            .entries
            .iter()
            .map(|e| (e.attractiveness - max_a).exp())
            .collect();
        let total: f64 = weights.iter().sum();

        let uniform = 1.0 / self.entries.len() as f64;
        let mut cumulative = 0.0;
        for (entry, weight) in self.entries.iter_mut().zip(weights) {
            entry.probability = if total.is_finite() && total > 0.0 {
                weight / total
            } else {
                uniform
            };
            cumulative += entry.probability;
            entry.cumulative = cumulative;
        }
    }

    /// Pick an option by inverse-CDF sampling
    pub fn select(&mut self, rng: &mut RngManager) -> &S {
        let threshold = rng.next_f64();
        // Rounding can leave the final F a hair under 1
        let index = self
            .entries
            .iter()
            .position(|e| e.cumulative > threshold)
            .unwrap_or(self.entries.len() - 1);
        self.chosen = Some(index);
        &self.entries[index].option
    }

    /// Write the realized profit signal back to the chosen option
    ///
    /// No-op before the first selection.
    pub fn record_profit(&mut self, profit: f64) {
        if let Some(index) = self.chosen {
            self.entries[index].last_profit = profit;
        }
    }

    pub fn chosen(&self) -> Option<&S> {
        self.chosen.map(|i| &self.entries[i].option)
    }

    pub fn chosen_index(&self) -> Option<usize> {
        self.chosen
    }

    pub fn entries(&self) -> &[StrategyEntry<S>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_pool_is_uniform() {
        let mut pool = StrategyPool::<DepositorStrategy>::new(DEPOSITOR_ATTRACTION_DECAY);
        pool.update_probabilities();
        for entry in pool.entries() {
            assert!((entry.probability - 0.1).abs() < 1e-12);
        }
        assert!((pool.entries()[9].cumulative - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_profitable_option_gains_probability() {
        let mut pool = StrategyPool::<DepositorStrategy>::new(DEPOSITOR_ATTRACTION_DECAY);
        let mut rng = RngManager::new(3);
        pool.update_probabilities();
        pool.select(&mut rng);
        let chosen = pool.chosen_index().unwrap();
        pool.record_profit(5.0);
        pool.update_probabilities();

        let p_chosen = pool.entries()[chosen].probability;
        for (i, entry) in pool.entries().iter().enumerate() {
            if i != chosen {
                assert!(p_chosen > entry.probability);
            }
        }
    }

    #[test]
    fn test_huge_attractiveness_does_not_overflow() {
        let mut pool = StrategyPool::<CentralBankStrategy>::new(BANK_ATTRACTION_DECAY);
        let mut rng = RngManager::new(9);
        pool.update_probabilities();
        pool.select(&mut rng);
        pool.record_profit(1.0e6);
        pool.update_probabilities();
        let sum: f64 = pool.entries().iter().map(|e| e.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(pool.entries().iter().all(|e| e.probability.is_finite()));
    }

    #[test]
    fn test_record_profit_before_selection_is_noop() {
        let mut pool = StrategyPool::<DepositorStrategy>::new(DEPOSITOR_ATTRACTION_DECAY);
        pool.record_profit(100.0);
        assert!(pool.entries().iter().all(|e| e.last_profit == 0.0));
    }
}
