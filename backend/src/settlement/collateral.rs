//! Collateral guarantee waterfall
//!
//! With the clearing guarantee enabled, every net interbank debtor pledges
//! collateral in proportion to its share of total interbank debt, sized
//! against the single biggest debt in the system. Residual collateral of
//! banks with a surplus is redistributed to cover banks with a deficit,
//! and the pledged amount is seized from liquid assets first, then from
//! the loan book.

use crate::models::bank::Bank;
use serde::{Deserialize, Serialize};

/// System-wide aggregates of one guarantee round
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeTotals {
    /// Sum of debtor positions, sign-flipped to positive
    pub total_interbank_debt: f64,
    /// Most negative single position (non-positive)
    pub biggest_interbank_debt: f64,
    /// Sum of negative residuals (non-positive)
    pub total_collateral_deficit: f64,
    /// Sum of positive residuals
    pub total_collateral_surplus: f64,
}

/// Collateral seized from one bank
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollateralPledge {
    pub bank: usize,
    pub collateral: f64,
    pub residual: f64,
}

pub fn total_and_biggest_interbank_debt(banks: &[Bank]) -> GuaranteeTotals {
    let mut totals = GuaranteeTotals::default();
    for bank in banks {
        let position = bank.balance_sheet().interbank_loan;
        if position < totals.biggest_interbank_debt {
            totals.biggest_interbank_debt = position;
        }
        if position < 0.0 {
            totals.total_interbank_debt -= position;
        }
    }
    totals
}

/// Step 2: size each debtor's pledge against its own exposure
fn size_pledges(banks: &mut [Bank], totals: &GuaranteeTotals) {
    for bank in banks.iter_mut() {
        bank.reset_collateral();
        let sheet = *bank.balance_sheet();
        if !sheet.is_interbank_debtor() || totals.total_interbank_debt == 0.0 {
            continue;
        }

        let share = -sheet.interbank_loan / totals.total_interbank_debt;
        let potential = -totals.biggest_interbank_debt * share;
        let capital = sheet.capital();

        let feasible = potential
            .min(sheet.liquid_assets + sheet.non_financial_sector_loan)
            .min((-sheet.interbank_loan - capital.min(0.0)).max(0.0));
        let impact = (capital + feasible).min(-sheet.interbank_loan).max(0.0);

        let scratch = bank.guarantee_mut();
        scratch.potential_collateral = potential;
        scratch.feasible_collateral = feasible;
        scratch.outstanding_amount_impact = impact;
        scratch.residual = feasible - impact;
    }
}

/// Run the full waterfall and seize the pledged collateral
pub fn apply_clearing_guarantee(banks: &mut [Bank]) -> (GuaranteeTotals, Vec<CollateralPledge>) {
    let mut totals = total_and_biggest_interbank_debt(banks);
    size_pledges(banks, &totals);

    for bank in banks.iter() {
        let residual = bank.guarantee().residual;
        if residual < 0.0 {
            totals.total_collateral_deficit += residual;
        } else {
            totals.total_collateral_surplus += residual;
        }
    }

    let surrendered = if totals.total_collateral_surplus == 0.0 {
        1.0
    } else {
        (-totals.total_collateral_deficit / totals.total_collateral_surplus).min(1.0)
    };

    let mut pledges = Vec::new();
    for (position, bank) in banks.iter_mut().enumerate() {
        let scratch = bank.guarantee_mut();
        scratch.redistributed_collateral = if scratch.residual < 0.0 {
            scratch.residual
        } else {
            (1.0 - surrendered) * scratch.residual
        };
        scratch.collateral_adjustment =
            scratch.outstanding_amount_impact + scratch.redistributed_collateral;
        let collateral = scratch.feasible_collateral - scratch.collateral_adjustment;
        let residual = scratch.residual;

        let sheet = bank.sheet_mut();
        sheet.non_financial_sector_loan -= (collateral - sheet.liquid_assets).max(0.0);
        sheet.liquid_assets -= sheet.liquid_assets.min(collateral);

        if collateral != 0.0 {
            pledges.push(CollateralPledge {
                bank: position,
                collateral,
                residual,
            });
        }
    }
    (totals, pledges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::IdentityIssuer;
    use crate::models::balance_sheet::BalanceSheet;
    use crate::strategy::BankStrategy;

    fn bank(ids: &mut IdentityIssuer, index: usize, sheet: BalanceSheet) -> Bank {
        let mut bank = Bank::new(ids.issue(), index, 1.0, BankStrategy::new(0.08, 0.10), false);
        *bank.balance_sheet_mut() = sheet;
        bank
    }

    #[test]
    fn test_totals_track_sum_and_biggest_debt() {
        let mut ids = IdentityIssuer::new();
        let banks = vec![
            bank(&mut ids, 0, BalanceSheet { interbank_loan: 5.0, ..Default::default() }),
            bank(&mut ids, 1, BalanceSheet { interbank_loan: -3.0, ..Default::default() }),
            bank(&mut ids, 2, BalanceSheet { interbank_loan: -2.0, ..Default::default() }),
        ];
        let totals = total_and_biggest_interbank_debt(&banks);
        assert_eq!(totals.total_interbank_debt, 5.0);
        assert_eq!(totals.biggest_interbank_debt, -3.0);
    }

    #[test]
    fn test_creditors_pledge_nothing() {
        let mut ids = IdentityIssuer::new();
        let mut banks = vec![bank(
            &mut ids,
            0,
            BalanceSheet {
                liquid_assets: 1.0,
                interbank_loan: 5.0,
                deposits: -6.0,
                ..Default::default()
            },
        )];
        let (totals, pledges) = apply_clearing_guarantee(&mut banks);
        assert_eq!(totals.total_interbank_debt, 0.0);
        assert!(pledges.is_empty());
        assert_eq!(banks[0].balance_sheet().liquid_assets, 1.0);
    }

    #[test]
    fn test_insolvent_debtor_ends_with_collateral_deficit() {
        let mut ids = IdentityIssuer::new();
        // capital = -(1 + 2 - 4 - 1) = 2 (insolvent)
        let mut banks = vec![bank(
            &mut ids,
            0,
            BalanceSheet {
                liquid_assets: 1.0,
                non_financial_sector_loan: 2.0,
                interbank_loan: -4.0,
                deposits: -1.0,
                ..Default::default()
            },
        )];
        let (totals, pledges) = apply_clearing_guarantee(&mut banks);
        assert_eq!(totals.total_collateral_deficit, -1.0);
        assert!(pledges.is_empty());
        let scratch = banks[0].guarantee();
        assert_eq!(scratch.potential_collateral, 4.0);
        assert_eq!(scratch.feasible_collateral, 3.0);
        assert_eq!(scratch.outstanding_amount_impact, 4.0);
        assert_eq!(scratch.residual, -1.0);
    }
}
