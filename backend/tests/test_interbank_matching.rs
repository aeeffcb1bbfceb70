//! Interbank matching: queue walk, ledger bookkeeping, position write-back

use banksim_core::orchestrator::InterbankPriority;
use banksim_core::{Bank, BankStrategy, ClearingHouse, IdentityIssuer, RngManager};
use proptest::prelude::*;

fn banks_with_needs(needs: &[f64]) -> Vec<Bank> {
    let mut ids = IdentityIssuer::new();
    needs
        .iter()
        .enumerate()
        .map(|(index, &n)| {
            let mut bank = Bank::new(ids.issue(), index, 1.0, BankStrategy::new(0.08, 0.10), false);
            bank.set_liquidity_needs(n);
            bank
        })
        .collect()
}

#[test]
fn test_single_pair_match() {
    let mut banks = banks_with_needs(&[15.0, -10.0]);
    let mut house = ClearingHouse::new(2, false, InterbankPriority::Random);
    let mut rng = RngManager::new(7);

    let trades = house.organize_interbank_market(&mut banks, &mut rng);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].lender, 0);
    assert_eq!(trades[0].borrower, 1);
    assert_eq!(trades[0].amount, 10.0);

    assert_eq!(house.ledger().get(0, 1), 10.0);
    assert_eq!(house.ledger().get(1, 0), -10.0);

    let lender = banks[0].balance_sheet();
    assert_eq!(lender.interbank_loan, 10.0);
    assert_eq!(lender.liquid_assets, 5.0);
    assert_eq!(banks[0].liquidity_needs(), 0.0);

    let borrower = banks[1].balance_sheet();
    assert_eq!(borrower.interbank_loan, -10.0);
    assert_eq!(borrower.deposits, 10.0);
    assert_eq!(banks[1].liquidity_needs(), 0.0);
}

#[test]
fn test_unmet_demand_stays_as_liquidity_needs() {
    let mut banks = banks_with_needs(&[3.0, -5.0, -2.0]);
    let mut house = ClearingHouse::new(3, false, InterbankPriority::RiskSorted);
    let mut rng = RngManager::new(1);

    house.organize_interbank_market(&mut banks, &mut rng);

    // equal strategies keep construction order under risk sorting
    assert_eq!(house.offering_queue(), &[0]);
    assert_eq!(house.needing_queue(), &[1, 2]);
    assert_eq!(banks[0].balance_sheet().interbank_loan, 3.0);
    assert_eq!(banks[0].balance_sheet().liquid_assets, 0.0);
    assert_eq!(banks[1].liquidity_needs(), -2.0);
    assert_eq!(banks[2].liquidity_needs(), -2.0);
    assert_eq!(banks[2].balance_sheet().interbank_loan, 0.0);
}

#[test]
fn test_zero_needs_bank_queues_as_borrower_without_trading() {
    let mut banks = banks_with_needs(&[0.0, 4.0]);
    let mut house = ClearingHouse::new(2, false, InterbankPriority::RiskSorted);
    let mut rng = RngManager::new(1);

    let trades = house.organize_interbank_market(&mut banks, &mut rng);

    assert_eq!(house.needing_queue(), &[0]);
    assert!(trades.is_empty());
    assert_eq!(banks[1].balance_sheet().liquid_assets, 4.0);
}

#[test]
fn test_risk_sorting_puts_strongest_first() {
    let mut ids = IdentityIssuer::new();
    let mut banks: Vec<Bank> = [(0.02, 0.05), (0.09, 0.01), (0.09, 0.15)]
        .iter()
        .enumerate()
        .map(|(index, &(alpha, beta))| {
            let mut bank = Bank::new(ids.issue(), index, 1.0, BankStrategy::new(alpha, beta), false);
            bank.set_liquidity_needs(1.0);
            bank
        })
        .collect();
    let mut house = ClearingHouse::new(3, false, InterbankPriority::RiskSorted);
    let mut rng = RngManager::new(3);

    house.organize_interbank_market(&mut banks, &mut rng);

    assert_eq!(house.offering_queue(), &[2, 1, 0]);
    assert_eq!(banks[2].interbank().priority_order, 0);
    assert_eq!(banks[0].interbank().priority_order, 2);
}

#[test]
fn test_interest_accrues_on_the_ledger() {
    let mut banks = banks_with_needs(&[10.0, -10.0]);
    let mut house = ClearingHouse::new(2, false, InterbankPriority::Random);
    let mut rng = RngManager::new(7);
    house.organize_interbank_market(&mut banks, &mut rng);

    house.accrue_interest(&mut banks, 0.01);

    assert!((banks[0].balance_sheet().interbank_loan - 10.1).abs() < 1e-12);
    assert!((banks[1].balance_sheet().interbank_loan + 10.1).abs() < 1e-12);
    assert!(house.ledger().is_antisymmetric(1e-12));
}

proptest! {
    #[test]
    fn prop_matched_volume_is_min_of_supply_and_demand(
        needs in prop::collection::vec(-10.0f64..10.0, 1..12),
        seed in any::<u64>(),
    ) {
        let supply: f64 = needs.iter().filter(|&&n| n > 0.0).sum();
        let demand: f64 = needs.iter().filter(|&&n| n <= 0.0).map(|n| -n).sum();

        let mut banks = banks_with_needs(&needs);
        let mut house = ClearingHouse::new(needs.len(), false, InterbankPriority::Random);
        let mut rng = RngManager::new(seed);
        let trades = house.organize_interbank_market(&mut banks, &mut rng);

        let matched: f64 = trades.iter().map(|t| t.amount).sum();
        prop_assert!((matched - supply.min(demand)).abs() < 1e-9);
        prop_assert!(house.ledger().is_antisymmetric(1e-12));
        prop_assert!(house.ledger().total().abs() < 1e-9);

        // one side of the market is exhausted
        let lender_left = banks
            .iter()
            .zip(&needs)
            .any(|(bank, &n)| n > 0.0 && bank.balance_sheet().liquid_assets > 1e-9);
        let borrower_left = banks.iter().any(|bank| bank.liquidity_needs() < -1e-9);
        prop_assert!(!(lender_left && borrower_left));

        for (position, bank) in banks.iter().enumerate() {
            prop_assert_eq!(bank.balance_sheet().interbank_loan, house.ledger().row_sum(position));
            prop_assert!(bank.liquidity_needs() <= 0.0);
        }
    }
}
