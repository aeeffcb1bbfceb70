//! Default contagion across the interbank ledger
//!
//! Every insolvent net debtor repays only a fraction of its interbank debt.
//! The haircut is applied to the debtor's ledger row and mirrored into its
//! creditors' claims, after which every bank's net position is recomputed.

use crate::models::balance_sheet::BalanceSheet;
use crate::models::bank::Bank;

use super::collateral::GuaranteeTotals;
use super::ledger::InterbankLedger;

/// Share of an insolvent debtor's interbank debt that is repaid
///
/// With the guarantee facility the rate depends only on the system-wide
/// collateral balance; without it the debtor's capital hole is absorbed
/// pro rata. Always clamped to `[0, 1]`.
pub fn recovery_rate(sheet: &BalanceSheet, guarantee: Option<&GuaranteeTotals>) -> f64 {
    let rate = match guarantee {
        Some(totals) => {
            if totals.total_interbank_debt == 0.0 {
                1.0
            } else {
                let uncovered =
                    (-totals.total_collateral_deficit - totals.total_collateral_surplus).max(0.0);
                (totals.total_interbank_debt + uncovered) / totals.total_interbank_debt
            }
        }
        None => {
            let debt = sheet.interbank_loan;
            if debt == 0.0 {
                1.0
            } else {
                (debt + (-debt).min(sheet.capital())) / debt
            }
        }
    };
    rate.clamp(0.0, 1.0)
}

/// Haircut every defaulting debtor and rewrite net positions
///
/// `recovery` is reset to all-ones and filled for the defaulting banks.
/// Returns the ledger indices of banks that were solvent before the
/// haircut and are insolvent after it.
pub fn propagate(
    ledger: &mut InterbankLedger,
    banks: &mut [Bank],
    recovery: &mut [f64],
    guarantee: Option<&GuaranteeTotals>,
) -> Vec<usize> {
    recovery.iter_mut().for_each(|rate| *rate = 1.0);

    for (position, bank) in banks.iter().enumerate() {
        let sheet = bank.balance_sheet();
        if sheet.is_insolvent() && sheet.is_interbank_debtor() {
            recovery[position] = recovery_rate(sheet, guarantee);
        }
    }

    for (position, &rate) in recovery.iter().enumerate() {
        if rate < 1.0 {
            ledger.scale_row_mirrored(position, rate);
        }
    }

    let mut newly_insolvent = Vec::new();
    for (position, bank) in banks.iter_mut().enumerate() {
        let was_solvent = bank.is_solvent();
        bank.set_interbank_position(ledger.row_sum(position));
        if was_solvent && bank.is_insolvent() {
            newly_insolvent.push(position);
        }
    }
    newly_insolvent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_rata_recovery_absorbs_capital_hole() {
        let sheet = BalanceSheet {
            liquid_assets: 1.0,
            non_financial_sector_loan: 8.0,
            interbank_loan: -10.0,
            deposits: -2.0,
            ..Default::default()
        };
        // capital = 3
        assert!((recovery_rate(&sheet, None) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_recovery_is_clamped() {
        let totals = GuaranteeTotals {
            total_interbank_debt: 4.0,
            biggest_interbank_debt: -4.0,
            total_collateral_deficit: -3.0,
            total_collateral_surplus: 1.0,
        };
        let rate = recovery_rate(&BalanceSheet::default(), Some(&totals));
        assert_eq!(rate, 1.0);

        let wiped_out = BalanceSheet {
            interbank_loan: -1.0,
            deposits: -5.0,
            ..Default::default()
        };
        assert_eq!(recovery_rate(&wiped_out, None), 0.0);
    }
}
