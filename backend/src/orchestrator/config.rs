//! Model configuration
//!
//! `ModelConfig` carries every exogenous factor of the banking network.
//! Defaults reproduce the baseline (`HighSpread`) economy; scenario presets
//! override a subset, and JSON overrides are applied on top. Validation
//! runs once, at construction time: everything inside a running cycle is
//! total.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::scenario::ScenarioPreset;

/// Configuration validation failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least 1, got {value}")]
    NonPositiveCount { field: &'static str, value: usize },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite rate above -100%, got {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Unknown scenario preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// How initial bank sizes are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankSizeDistribution {
    /// Every bank starts with size 1
    Vanilla,
    /// Sizes drawn from lognormal(-0.5, 1), then normalized to mean 1
    LogNormal,
}

/// Queue ordering for the interbank matching walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterbankPriority {
    /// Both queues shuffled independently
    Random,
    /// Both queues sorted descending by chosen (capital, liquidity) ratios
    RiskSorted,
}

/// Complete exogenous configuration of the banking network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Seed for the single deterministic random source
    pub rng_seed: u64,

    // Economy
    pub number_banks: usize,
    pub deposit_interest_rate: f64,
    pub interbank_interest_rate: f64,
    pub liquid_assets_interest_rate: f64,
    pub illiquid_asset_discount_rate: f64,
    pub interbank_lending_market_available: bool,
    pub banks_may_sell_non_liquid_assets_at_discount_prices: bool,
    pub banks_have_limited_liability: bool,

    // Banks
    pub bank_size_distribution: BankSizeDistribution,
    pub number_depositors_per_bank: usize,
    pub number_corporate_clients_per_bank: usize,
    pub are_banks_zero_intelligence_agents: bool,
    /// Capital ratio used by banks that do not learn
    pub default_capital_ratio: f64,
    /// Liquidity ratio used by banks that do not learn
    pub default_liquidity_ratio: f64,

    // Central bank
    pub central_bank_lending_interest_rate: f64,
    pub offers_discount_window_lending: bool,
    pub minimum_capital_adequacy_ratio: f64,
    pub is_central_bank_zero_intelligence_agent: bool,
    pub is_capital_requirement_active: bool,
    pub is_too_big_to_fail_policy_active: bool,
    pub is_deposit_insurance_available: bool,

    // Clearing house
    pub is_clearing_guarantee_available: bool,
    pub interbank_priority: InterbankPriority,

    // Depositors
    pub are_depositors_zero_intelligence_agents: bool,
    pub are_bank_runs_possible: bool,
    pub amount_withdrawn: f64,
    pub probability_of_withdrawal: f64,

    // Corporate clients
    pub standard_corporate_clients: bool,
    pub standard_corporate_client_default_rate: f64,
    pub standard_corporate_client_loss_given_default: f64,
    pub standard_corporate_client_loan_interest_rate: f64,
    pub wholesale_corporate_client_default_rate: f64,
    pub wholesale_corporate_client_loss_given_default: f64,
    pub wholesale_corporate_client_loan_interest_rate: f64,
    pub retail_corporate_client_default_rate: f64,

    // Risk weights
    pub cash_risk_weight: f64,
    pub corporate_loan_risk_weight: f64,
    pub interbank_loan_risk_weight: f64,
    pub retail_corporate_loan_risk_weight: f64,
    pub wholesale_corporate_loan_risk_weight: f64,

    // Learning
    #[serde(rename = "EWADampingFactor")]
    pub ewa_damping_factor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rng_seed: 12345,

            number_banks: 10,
            deposit_interest_rate: 0.005,
            interbank_interest_rate: 0.01,
            liquid_assets_interest_rate: 0.0,
            illiquid_asset_discount_rate: 0.15,
            interbank_lending_market_available: true,
            banks_may_sell_non_liquid_assets_at_discount_prices: true,
            banks_have_limited_liability: false,

            bank_size_distribution: BankSizeDistribution::Vanilla,
            number_depositors_per_bank: 100,
            number_corporate_clients_per_bank: 50,
            are_banks_zero_intelligence_agents: false,
            default_capital_ratio: 0.08,
            default_liquidity_ratio: 0.10,

            central_bank_lending_interest_rate: 0.04,
            offers_discount_window_lending: true,
            // Far below any attainable ratio: requirement effectively off
            minimum_capital_adequacy_ratio: -10.0,
            is_central_bank_zero_intelligence_agent: true,
            is_capital_requirement_active: false,
            is_too_big_to_fail_policy_active: false,
            is_deposit_insurance_available: false,

            is_clearing_guarantee_available: false,
            interbank_priority: InterbankPriority::Random,

            are_depositors_zero_intelligence_agents: true,
            are_bank_runs_possible: true,
            amount_withdrawn: 1.0,
            probability_of_withdrawal: 0.15,

            standard_corporate_clients: true,
            standard_corporate_client_default_rate: 0.045,
            standard_corporate_client_loss_given_default: 1.0,
            standard_corporate_client_loan_interest_rate: 0.08,
            wholesale_corporate_client_default_rate: 0.04,
            wholesale_corporate_client_loss_given_default: 1.0,
            wholesale_corporate_client_loan_interest_rate: 0.06,
            retail_corporate_client_default_rate: 0.06,

            cash_risk_weight: 0.0,
            corporate_loan_risk_weight: 1.0,
            interbank_loan_risk_weight: 1.0,
            retail_corporate_loan_risk_weight: 0.75,
            wholesale_corporate_loan_risk_weight: 1.0,

            ewa_damping_factor: 1.0,
        }
    }
}

/// Risk weights and client classes used by the capital-adequacy computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalRules {
    pub cash_weight: f64,
    pub corporate_weight: f64,
    pub interbank_weight: f64,
    pub retail_weight: f64,
    pub wholesale_weight: f64,
    /// Single corporate weight for every client when true
    pub standard_clients: bool,
    pub retail_default_rate: f64,
    pub wholesale_default_rate: f64,
}

/// Loan terms of one class of corporate client
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientTerms {
    pub default_rate: f64,
    pub loss_given_default: f64,
    pub loan_interest_rate: f64,
}

impl ModelConfig {
    /// Baseline config with a preset applied
    pub fn from_preset(preset: ScenarioPreset) -> Self {
        let mut config = Self::default();
        preset.apply(&mut config);
        config
    }

    /// Preset, then JSON overrides (camelCase keys), then validation
    ///
    /// # Example
    /// ```
    /// use banksim_core::{ModelConfig, ScenarioPreset};
    ///
    /// let overrides = serde_json::json!({ "numberBanks": 4 });
    /// let config = ModelConfig::with_overrides(ScenarioPreset::ClearingHouse, &overrides).unwrap();
    /// assert_eq!(config.number_banks, 4);
    /// assert!(config.is_clearing_guarantee_available);
    /// ```
    pub fn with_overrides(
        preset: ScenarioPreset,
        overrides: &serde_json::Value,
    ) -> Result<Self, ConfigError> {
        let base = Self::from_preset(preset);
        let mut merged =
            serde_json::to_value(&base).map_err(|e| ConfigError::Malformed(e.to_string()))?;

        let patch = match overrides {
            serde_json::Value::Null => None,
            serde_json::Value::Object(map) => Some(map),
            other => {
                return Err(ConfigError::Malformed(format!(
                    "overrides must be a JSON object, got {}",
                    other
                )))
            }
        };

        if let (Some(patch), serde_json::Value::Object(target)) = (patch, &mut merged) {
            for (key, value) in patch {
                if !target.contains_key(key) {
                    return Err(ConfigError::UnknownKey(key.clone()));
                }
                target.insert(key.clone(), value.clone());
            }
        }

        let config: Self =
            serde_json::from_value(merged).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on values outside sane ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("numberBanks", self.number_banks),
            ("numberDepositorsPerBank", self.number_depositors_per_bank),
            (
                "numberCorporateClientsPerBank",
                self.number_corporate_clients_per_bank,
            ),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::NonPositiveCount { field, value });
            }
        }

        let unit = [
            ("amountWithdrawn", self.amount_withdrawn),
            ("probabilityOfWithdrawal", self.probability_of_withdrawal),
            ("defaultCapitalRatio", self.default_capital_ratio),
            ("defaultLiquidityRatio", self.default_liquidity_ratio),
            (
                "standardCorporateClientDefaultRate",
                self.standard_corporate_client_default_rate,
            ),
            (
                "standardCorporateClientLossGivenDefault",
                self.standard_corporate_client_loss_given_default,
            ),
            (
                "wholesaleCorporateClientDefaultRate",
                self.wholesale_corporate_client_default_rate,
            ),
            (
                "wholesaleCorporateClientLossGivenDefault",
                self.wholesale_corporate_client_loss_given_default,
            ),
            (
                "retailCorporateClientDefaultRate",
                self.retail_corporate_client_default_rate,
            ),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }

        let non_negative = [
            ("illiquidAssetDiscountRate", self.illiquid_asset_discount_rate),
            ("cashRiskWeight", self.cash_risk_weight),
            ("corporateLoanRiskWeight", self.corporate_loan_risk_weight),
            ("interbankLoanRiskWeight", self.interbank_loan_risk_weight),
            (
                "retailCorporateLoanRiskWeight",
                self.retail_corporate_loan_risk_weight,
            ),
            (
                "wholesaleCorporateLoanRiskWeight",
                self.wholesale_corporate_loan_risk_weight,
            ),
            ("EWADampingFactor", self.ewa_damping_factor),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let rates = [
            ("depositInterestRate", self.deposit_interest_rate),
            ("interbankInterestRate", self.interbank_interest_rate),
            ("liquidAssetsInterestRate", self.liquid_assets_interest_rate),
            (
                "centralBankLendingInterestRate",
                self.central_bank_lending_interest_rate,
            ),
            (
                "standardCorporateClientLoanInterestRate",
                self.standard_corporate_client_loan_interest_rate,
            ),
            (
                "wholesaleCorporateClientLoanInterestRate",
                self.wholesale_corporate_client_loan_interest_rate,
            ),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value <= -1.0 {
                return Err(ConfigError::InvalidRate { field, value });
            }
        }

        if !self.minimum_capital_adequacy_ratio.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "minimumCapitalAdequacyRatio",
                value: self.minimum_capital_adequacy_ratio,
            });
        }

        Ok(())
    }

    /// Capital-adequacy inputs derived from this config
    pub fn capital_rules(&self) -> CapitalRules {
        CapitalRules {
            cash_weight: self.cash_risk_weight,
            corporate_weight: self.corporate_loan_risk_weight,
            interbank_weight: self.interbank_loan_risk_weight,
            retail_weight: self.retail_corporate_loan_risk_weight,
            wholesale_weight: self.wholesale_corporate_loan_risk_weight,
            standard_clients: self.standard_corporate_clients,
            retail_default_rate: self.retail_corporate_client_default_rate,
            wholesale_default_rate: self.wholesale_corporate_client_default_rate,
        }
    }

    /// Terms given to newly constructed corporate clients
    ///
    /// Non-standard economies lend to the wholesale class.
    pub fn client_terms(&self) -> ClientTerms {
        if self.standard_corporate_clients {
            ClientTerms {
                default_rate: self.standard_corporate_client_default_rate,
                loss_given_default: self.standard_corporate_client_loss_given_default,
                loan_interest_rate: self.standard_corporate_client_loan_interest_rate,
            }
        } else {
            ClientTerms {
                default_rate: self.wholesale_corporate_client_default_rate,
                loss_given_default: self.wholesale_corporate_client_loss_given_default,
                loan_interest_rate: self.wholesale_corporate_client_loan_interest_rate,
            }
        }
    }

    /// SHA-256 of the canonical JSON encoding, lowercase hex
    pub fn fingerprint(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        format!("{:x}", hasher.finalize())
    }
}
