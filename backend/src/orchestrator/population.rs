//! Population construction
//!
//! Wires the central bank, clearing house, banks and each bank's
//! depositors and corporate clients. Identities are handed out here and
//! nowhere else.

use crate::core::identity::IdentityIssuer;
use crate::models::{Bank, CentralBank, CorporateClient, Depositor};
use crate::rng::RngManager;
use crate::settlement::ClearingHouse;
use crate::strategy::BankStrategy;

use super::config::{BankSizeDistribution, ModelConfig};

/// Parameters of the lognormal bank-size draw
const LOG_NORMAL_MEAN: f64 = -0.5;
const LOG_NORMAL_SD: f64 = 1.0;

/// Every agent of one model instance
#[derive(Debug, Clone)]
pub struct Population {
    pub banks: Vec<Bank>,
    pub central_bank: CentralBank,
    pub clearing_house: ClearingHouse,
}

/// Build the full population for `config`
///
/// `config` must already be validated.
pub fn build_population(
    config: &ModelConfig,
    rng: &mut RngManager,
    ids: &mut IdentityIssuer,
) -> Population {
    let central_bank = CentralBank::new(ids.issue(), config);
    let clearing_house = ClearingHouse::new(
        config.number_banks,
        config.is_clearing_guarantee_available,
        config.interbank_priority,
    );

    let fixed_strategy = BankStrategy::new(config.default_capital_ratio, config.default_liquidity_ratio);
    let banks_learn = !config.are_banks_zero_intelligence_agents;
    let mut banks: Vec<Bank> = (0..config.number_banks)
        .map(|index| {
            let size = match config.bank_size_distribution {
                BankSizeDistribution::Vanilla => 1.0,
                BankSizeDistribution::LogNormal => rng.log_normal(LOG_NORMAL_MEAN, LOG_NORMAL_SD),
            };
            Bank::new(ids.issue(), index, size, fixed_strategy, banks_learn)
        })
        .collect();
    normalize_banks(&mut banks);

    let depositors_learn = !config.are_depositors_zero_intelligence_agents;
    let terms = config.client_terms();
    for bank in &mut banks {
        for _ in 0..config.number_depositors_per_bank {
            bank.add_depositor(Depositor::new(ids.issue(), depositors_learn));
        }
        for _ in 0..config.number_corporate_clients_per_bank {
            bank.add_corporate_client(CorporateClient::new(ids.issue(), terms));
        }
    }

    Population {
        banks,
        central_bank,
        clearing_house,
    }
}

/// Rescale sizes to mean 1 and record each bank's market share
pub fn normalize_banks(banks: &mut [Bank]) {
    let total_size: f64 = banks.iter().map(|bank| bank.initial_size()).sum();
    if total_size <= 0.0 {
        return;
    }
    let factor = banks.len() as f64 / total_size;
    for bank in banks.iter_mut() {
        let size = bank.initial_size();
        bank.set_size(size * factor, size / total_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_shape_follows_config() {
        let config = ModelConfig {
            number_banks: 3,
            number_depositors_per_bank: 4,
            number_corporate_clients_per_bank: 2,
            ..ModelConfig::default()
        };
        let mut rng = RngManager::new(config.rng_seed);
        let mut ids = IdentityIssuer::new();
        let population = build_population(&config, &mut rng, &mut ids);

        assert_eq!(population.banks.len(), 3);
        assert!(population.banks.iter().all(|b| b.depositors().len() == 4));
        assert!(population.banks.iter().all(|b| b.corporate_clients().len() == 2));
        // central bank + 3 × (bank + 4 + 2)
        assert_eq!(ids.issued(), 1 + 3 * 7);
        for (position, bank) in population.banks.iter().enumerate() {
            assert_eq!(bank.index(), position);
        }
    }

    #[test]
    fn test_lognormal_sizes_normalize_to_mean_one() {
        let config = ModelConfig {
            number_banks: 8,
            bank_size_distribution: BankSizeDistribution::LogNormal,
            ..ModelConfig::default()
        };
        let mut rng = RngManager::new(77);
        let mut ids = IdentityIssuer::new();
        let population = build_population(&config, &mut rng, &mut ids);

        let mean: f64 = population.banks.iter().map(|b| b.initial_size()).sum::<f64>() / 8.0;
        let shares: f64 = population.banks.iter().map(|b| b.market_share()).sum();
        assert!((mean - 1.0).abs() < 1e-9);
        assert!((shares - 1.0).abs() < 1e-9);
    }
}
