//! EWA strategy pools: probabilities, selection, decay

use banksim_core::strategy::{
    CentralBankStrategy, DepositorStrategy, StrategyOption, StrategyPool, BANK_ATTRACTION_DECAY,
    DEPOSITOR_ATTRACTION_DECAY,
};
use banksim_core::{BankStrategy, RngManager};
use proptest::prelude::*;

fn thresholds(values: &[f64]) -> Vec<DepositorStrategy> {
    values
        .iter()
        .map(|&safety_threshold| DepositorStrategy { safety_threshold })
        .collect()
}

#[test]
fn test_menus_have_expected_sizes() {
    assert_eq!(BankStrategy::menu().len(), 200);
    assert_eq!(DepositorStrategy::menu().len(), 10);
    assert_eq!(CentralBankStrategy::menu().len(), 10);
    assert_eq!(CentralBankStrategy::menu()[9].minimum_capital_ratio, 0.10);
}

#[test]
fn test_selection_takes_first_option_above_the_draw() {
    let mut pool = StrategyPool::from_options(thresholds(&[0.01, 0.02, 0.03, 0.04]), BANK_ATTRACTION_DECAY);
    pool.update_probabilities();

    for seed in 0..50 {
        let u = RngManager::new(seed).next_f64();
        let expected = pool
            .entries()
            .iter()
            .position(|e| e.cumulative > u)
            .unwrap_or(3);
        pool.select(&mut RngManager::new(seed));
        assert_eq!(pool.chosen_index(), Some(expected));
    }
}

#[test]
fn test_attractiveness_decays_for_banks_only() {
    let mut bank_pool = StrategyPool::from_options(thresholds(&[0.01]), 0.5);
    let mut depositor_pool = StrategyPool::from_options(thresholds(&[0.01]), DEPOSITOR_ATTRACTION_DECAY);
    let mut rng = RngManager::new(1);

    for pool in [&mut bank_pool, &mut depositor_pool] {
        pool.update_probabilities();
        pool.select(&mut rng);
        pool.record_profit(4.0);
        pool.update_probabilities();
        pool.update_probabilities();
    }

    // 0.5 · 4 + 4 vs 4 + 4
    assert_eq!(bank_pool.entries()[0].attractiveness, 6.0);
    assert_eq!(depositor_pool.entries()[0].attractiveness, 8.0);
}

#[test]
fn test_profit_before_selection_is_ignored() {
    let mut pool = StrategyPool::<DepositorStrategy>::new(DEPOSITOR_ATTRACTION_DECAY);
    pool.record_profit(100.0);
    pool.update_probabilities();
    assert!(pool.entries().iter().all(|e| e.attractiveness == 0.0));
    assert!((pool.entries()[0].probability - 0.1).abs() < 1e-12);
}

#[test]
fn test_rewarded_option_gains_probability() {
    let mut pool = StrategyPool::<CentralBankStrategy>::new(BANK_ATTRACTION_DECAY);
    let mut rng = RngManager::new(11);
    pool.update_probabilities();
    pool.select(&mut rng);
    let chosen = pool.chosen_index().unwrap();
    pool.record_profit(3.0);
    pool.update_probabilities();

    let p = pool.entries()[chosen].probability;
    assert!(pool
        .entries()
        .iter()
        .enumerate()
        .all(|(i, e)| i == chosen || e.probability < p));
}

proptest! {
    #[test]
    fn prop_cdf_stays_valid(
        profits in prop::collection::vec(-1000.0f64..1000.0, 1..40),
        seed in any::<u64>(),
    ) {
        let mut pool = StrategyPool::<BankStrategy>::new(BANK_ATTRACTION_DECAY);
        let mut rng = RngManager::new(seed);

        for profit in profits {
            pool.update_probabilities();
            pool.select(&mut rng);
            pool.record_profit(profit);
        }
        pool.update_probabilities();

        let entries = pool.entries();
        let total: f64 = entries.iter().map(|e| e.probability).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(entries.iter().all(|e| e.probability >= 0.0 && e.probability.is_finite()));
        prop_assert!(entries.windows(2).all(|w| w[0].cumulative <= w[1].cumulative));
        prop_assert!((entries[entries.len() - 1].cumulative - 1.0).abs() < 1e-9);
    }
}
