//! Strategy menus for the three learning agent kinds

use super::StrategyOption;
use serde::{Deserialize, Serialize};

/// Bank strategy: target capital ratio (α) × target liquidity ratio (β)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankStrategy {
    pub capital_ratio: f64,
    pub liquidity_ratio: f64,
}

impl BankStrategy {
    /// Number of capital-ratio options (1%..10%)
    pub const CAPITAL_OPTIONS: usize = 10;
    /// Number of liquidity-ratio options (1%..20%)
    pub const LIQUIDITY_OPTIONS: usize = 20;

    pub fn new(capital_ratio: f64, liquidity_ratio: f64) -> Self {
        Self {
            capital_ratio,
            liquidity_ratio,
        }
    }

    /// Key used by risk-sorted interbank queues
    pub fn risk_key(&self) -> (f64, f64) {
        (self.capital_ratio, self.liquidity_ratio)
    }
}

impl StrategyOption for BankStrategy {
    fn menu() -> Vec<Self> {
        (0..Self::CAPITAL_OPTIONS)
            .flat_map(|a| {
                (0..Self::LIQUIDITY_OPTIONS)
                    .map(move |b| BankStrategy::new((a + 1) as f64 / 100.0, (b + 1) as f64 / 100.0))
            })
            .collect()
    }
}

/// Depositor strategy: withdraw when the bank's CAR is at or below this threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositorStrategy {
    pub safety_threshold: f64,
}

impl StrategyOption for DepositorStrategy {
    fn menu() -> Vec<Self> {
        (0..10)
            .map(|a| DepositorStrategy {
                safety_threshold: (a + 1) as f64 / 100.0,
            })
            .collect()
    }
}

/// Central-bank strategy: the regulatory minimum capital-adequacy ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralBankStrategy {
    pub minimum_capital_ratio: f64,
}

impl StrategyOption for CentralBankStrategy {
    fn menu() -> Vec<Self> {
        (0..10)
            .map(|a| CentralBankStrategy {
                minimum_capital_ratio: (a + 1) as f64 / 100.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_menu_is_capital_major() {
        let menu = BankStrategy::menu();
        assert_eq!(menu.len(), 200);
        assert_eq!(menu[0], BankStrategy::new(0.01, 0.01));
        assert_eq!(menu[1], BankStrategy::new(0.01, 0.02));
        assert_eq!(menu[20], BankStrategy::new(0.02, 0.01));
        assert_eq!(menu[199], BankStrategy::new(0.10, 0.20));
    }
}
