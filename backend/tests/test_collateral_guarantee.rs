//! Clearing-guarantee collateral waterfall

use banksim_core::orchestrator::InterbankPriority;
use banksim_core::settlement::collateral::{apply_clearing_guarantee, total_and_biggest_interbank_debt};
use banksim_core::{BalanceSheet, Bank, BankStrategy, ClearingHouse, IdentityIssuer};

fn bank(ids: &mut IdentityIssuer, index: usize, sheet: BalanceSheet) -> Bank {
    let mut bank = Bank::new(ids.issue(), index, 1.0, BankStrategy::new(0.08, 0.10), false);
    *bank.balance_sheet_mut() = sheet;
    bank
}

/// One creditor and two debtors, the second of which is insolvent
fn network() -> Vec<Bank> {
    let mut ids = IdentityIssuer::new();
    vec![
        bank(
            &mut ids,
            0,
            BalanceSheet {
                liquid_assets: 1.0,
                interbank_loan: 6.0,
                deposits: -6.0,
                ..Default::default()
            },
        ),
        bank(
            &mut ids,
            1,
            BalanceSheet {
                liquid_assets: 0.4,
                non_financial_sector_loan: 7.6,
                interbank_loan: -4.0,
                deposits: -3.0,
                ..Default::default()
            },
        ),
        bank(
            &mut ids,
            2,
            BalanceSheet {
                non_financial_sector_loan: 1.0,
                interbank_loan: -2.0,
                deposits: -1.0,
                ..Default::default()
            },
        ),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_debt_totals() {
    let totals = total_and_biggest_interbank_debt(&network());
    assert_eq!(totals.total_interbank_debt, 6.0);
    assert_eq!(totals.biggest_interbank_debt, -4.0);
}

#[test]
fn test_waterfall_sizes_each_pledge() {
    let mut banks = network();
    let (totals, pledges) = apply_clearing_guarantee(&mut banks);

    // solvent debtor: potential 16/6, impact 5/3, residual 1
    let solvent = banks[1].guarantee();
    assert!(close(solvent.potential_collateral, 16.0 / 6.0));
    assert!(close(solvent.feasible_collateral, 16.0 / 6.0));
    assert!(close(solvent.outstanding_amount_impact, 5.0 / 3.0));
    assert!(close(solvent.residual, 1.0));

    // insolvent debtor: feasible capped by its assets, residual -1
    let insolvent = banks[2].guarantee();
    assert!(close(insolvent.feasible_collateral, 1.0));
    assert!(close(insolvent.outstanding_amount_impact, 2.0));
    assert!(close(insolvent.residual, -1.0));

    assert!(close(totals.total_collateral_deficit, -1.0));
    assert!(close(totals.total_collateral_surplus, 1.0));

    // the creditor pledges nothing
    assert_eq!(banks[0].guarantee().feasible_collateral, 0.0);
    assert_eq!(banks[0].balance_sheet().liquid_assets, 1.0);

    assert!(pledges.iter().all(|p| p.bank != 0));
}

#[test]
fn test_seized_collateral_spills_into_loans() {
    let mut banks = network();
    apply_clearing_guarantee(&mut banks);

    // surplus fully consumed by the deficit: one unit seized from bank 1
    let sheet = banks[1].balance_sheet();
    assert!(close(sheet.liquid_assets, 0.0));
    assert!(close(sheet.non_financial_sector_loan, 7.0));

    // the insolvent debtor's pledge is entirely absorbed by its own debt
    let sheet = banks[2].balance_sheet();
    assert!(close(sheet.non_financial_sector_loan, 1.0));
}

#[test]
fn test_surplus_without_deficit_is_returned() {
    let mut ids = IdentityIssuer::new();
    let mut banks = vec![
        bank(
            &mut ids,
            0,
            BalanceSheet {
                interbank_loan: 4.0,
                deposits: -4.0,
                ..Default::default()
            },
        ),
        bank(
            &mut ids,
            1,
            BalanceSheet {
                liquid_assets: 0.5,
                non_financial_sector_loan: 10.0,
                interbank_loan: -4.0,
                deposits: -5.0,
                ..Default::default()
            },
        ),
    ];
    let (totals, _) = apply_clearing_guarantee(&mut banks);

    assert_eq!(totals.total_collateral_deficit, 0.0);
    assert!(close(totals.total_collateral_surplus, 1.5));
    let scratch = banks[1].guarantee();
    assert!(close(scratch.redistributed_collateral, 1.5));
    assert_eq!(banks[1].balance_sheet().liquid_assets, 0.5);
    assert_eq!(banks[1].balance_sheet().non_financial_sector_loan, 10.0);
}

#[test]
fn test_disabled_guarantee_is_a_no_op() {
    let mut banks = network();
    let mut house = ClearingHouse::new(3, false, InterbankPriority::Random);
    let pledges = house.interbank_clearing_guarantee(&mut banks);
    assert!(pledges.is_empty());
    assert_eq!(banks[1].balance_sheet().liquid_assets, 0.4);
    assert_eq!(house.totals().total_interbank_debt, 0.0);
}

#[test]
fn test_clearing_house_keeps_the_totals() {
    let mut banks = network();
    let mut house = ClearingHouse::new(3, true, InterbankPriority::Random);
    house.interbank_clearing_guarantee(&mut banks);
    assert_eq!(house.totals().total_interbank_debt, 6.0);
    assert!(close(house.totals().total_collateral_deficit, -1.0));
}
