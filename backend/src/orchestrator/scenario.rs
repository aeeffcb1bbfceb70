//! Named scenario presets
//!
//! Each preset is a bundle of overrides on top of the baseline economy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::config::{ConfigError, InterbankPriority, ModelConfig};

/// Named bundles of configuration overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioPreset {
    /// Baseline economy, high loan spread
    HighSpread,
    /// Standard loan rate lowered to 6%
    LowSpread,
    /// Interbank clearing guarantee switched on
    ClearingHouse,
    /// Clearing guarantee plus low loan spread
    ClearingHouseLowSpread,
    /// Capital requirements with a learning regulator and risk-sorted interbank queues
    Basel,
    /// Basel client mix without the regulatory machinery
    BaselBenchmark,
    /// Learning depositors protected by deposit insurance
    DepositInsurance,
    /// Learning depositors without insurance
    DepositInsuranceBenchmark,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 8] = [
        ScenarioPreset::HighSpread,
        ScenarioPreset::LowSpread,
        ScenarioPreset::ClearingHouse,
        ScenarioPreset::ClearingHouseLowSpread,
        ScenarioPreset::Basel,
        ScenarioPreset::BaselBenchmark,
        ScenarioPreset::DepositInsurance,
        ScenarioPreset::DepositInsuranceBenchmark,
    ];

    /// Apply this preset's overrides
    pub fn apply(self, config: &mut ModelConfig) {
        match self {
            ScenarioPreset::HighSpread => {}
            ScenarioPreset::LowSpread => {
                config.standard_corporate_client_loan_interest_rate = 0.06;
            }
            ScenarioPreset::ClearingHouse => {
                config.is_clearing_guarantee_available = true;
            }
            ScenarioPreset::ClearingHouseLowSpread => {
                config.is_clearing_guarantee_available = true;
                config.standard_corporate_client_loan_interest_rate = 0.06;
            }
            ScenarioPreset::Basel => {
                config.standard_corporate_clients = false;
                config.is_central_bank_zero_intelligence_agent = false;
                config.is_capital_requirement_active = true;
                config.interbank_priority = InterbankPriority::RiskSorted;
                config.standard_corporate_client_default_rate = 0.05;
            }
            ScenarioPreset::BaselBenchmark => {
                config.standard_corporate_clients = false;
                config.standard_corporate_client_default_rate = 0.05;
            }
            ScenarioPreset::DepositInsurance => {
                config.are_depositors_zero_intelligence_agents = false;
                config.is_deposit_insurance_available = true;
            }
            ScenarioPreset::DepositInsuranceBenchmark => {
                config.are_depositors_zero_intelligence_agents = false;
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScenarioPreset::HighSpread => "HighSpread",
            ScenarioPreset::LowSpread => "LowSpread",
            ScenarioPreset::ClearingHouse => "ClearingHouse",
            ScenarioPreset::ClearingHouseLowSpread => "ClearingHouseLowSpread",
            ScenarioPreset::Basel => "Basel",
            ScenarioPreset::BaselBenchmark => "BaselBenchmark",
            ScenarioPreset::DepositInsurance => "DepositInsurance",
            ScenarioPreset::DepositInsuranceBenchmark => "DepositInsuranceBenchmark",
        }
    }
}

impl Default for ScenarioPreset {
    fn default() -> Self {
        ScenarioPreset::HighSpread
    }
}

impl fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}
