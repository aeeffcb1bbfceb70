//! Bank balance sheet
//!
//! Five signed accounts. Asset accounts are non-negative, liability
//! accounts are conventionally non-positive, and the interbank account
//! is positive for a net creditor and negative for a net debtor.
//!
//! # Sign convention
//!
//! `capital = -(sum of all five accounts)`. A healthy bank has assets
//! exceeding its liabilities, so its capital is **non-positive**.
//! `capital > 0` means insolvent. Every solvency check in the crate
//! depends on this; do not flip it.
//!
//! Net worth is `assets + liabilities` (with the interbank account split
//! by sign), which always equals `-capital`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five balance-sheet accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Account {
    LiquidAssets,
    NonFinancialSectorLoan,
    InterbankLoan,
    DiscountWindowLoan,
    Deposits,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Account::LiquidAssets => "liquid_assets",
            Account::NonFinancialSectorLoan => "non_financial_sector_loan",
            Account::InterbankLoan => "interbank_loan",
            Account::DiscountWindowLoan => "discount_window_loan",
            Account::Deposits => "deposits",
        };
        f.write_str(name)
    }
}

/// Per-bank ledger of five accounts
///
/// # Example
/// ```
/// use banksim_core::BalanceSheet;
///
/// let sheet = BalanceSheet {
///     liquid_assets: 10.0,
///     non_financial_sector_loan: 90.0,
///     interbank_loan: 0.0,
///     discount_window_loan: 0.0,
///     deposits: -92.0,
/// };
/// assert_eq!(sheet.capital(), -8.0);
/// assert!(sheet.is_solvent());
/// assert_eq!(sheet.net_worth(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub liquid_assets: f64,
    pub non_financial_sector_loan: f64,
    pub interbank_loan: f64,
    pub discount_window_loan: f64,
    pub deposits: f64,
}

impl BalanceSheet {
    /// `-(sum of all accounts)`; non-positive when solvent
    pub fn capital(&self) -> f64 {
        -(self.liquid_assets
            + self.non_financial_sector_loan
            + self.interbank_loan
            + self.discount_window_loan
            + self.deposits)
    }

    /// Liquid assets, loans and any net interbank claim
    pub fn assets(&self) -> f64 {
        self.liquid_assets + self.non_financial_sector_loan + self.interbank_loan.max(0.0)
    }

    /// Deposits, discount-window debt and any net interbank debt (non-positive)
    pub fn liabilities(&self) -> f64 {
        self.deposits + self.discount_window_loan + self.interbank_loan.min(0.0)
    }

    /// `assets + liabilities`, equal to `-capital`
    pub fn net_worth(&self) -> f64 {
        self.assets() + self.liabilities()
    }

    /// Double-entry identity: `capital + assets + liabilities == 0`
    pub fn identity_holds(&self, tolerance: f64) -> bool {
        let scale = 1.0_f64
            .max(self.liquid_assets.abs())
            .max(self.non_financial_sector_loan.abs())
            .max(self.interbank_loan.abs())
            .max(self.discount_window_loan.abs())
            .max(self.deposits.abs());
        (self.capital() + self.net_worth()).abs() <= tolerance * scale
    }

    pub fn is_solvent(&self) -> bool {
        self.capital() <= 0.0
    }

    pub fn is_insolvent(&self) -> bool {
        self.capital() > 0.0
    }

    /// Net interbank lender (including a flat position)
    pub fn is_interbank_creditor(&self) -> bool {
        self.interbank_loan >= 0.0
    }

    pub fn is_interbank_debtor(&self) -> bool {
        self.interbank_loan < 0.0
    }

    /// Account value by name
    pub fn get(&self, account: Account) -> f64 {
        match account {
            Account::LiquidAssets => self.liquid_assets,
            Account::NonFinancialSectorLoan => self.non_financial_sector_loan,
            Account::InterbankLoan => self.interbank_loan,
            Account::DiscountWindowLoan => self.discount_window_loan,
            Account::Deposits => self.deposits,
        }
    }

    /// First account holding NaN or an infinity, if any
    pub fn first_non_finite(&self) -> Option<Account> {
        [
            Account::LiquidAssets,
            Account::NonFinancialSectorLoan,
            Account::InterbankLoan,
            Account::DiscountWindowLoan,
            Account::Deposits,
        ]
        .into_iter()
        .find(|account| !self.get(*account).is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(la: f64, nfl: f64, ib: f64, dw: f64, dep: f64) -> BalanceSheet {
        BalanceSheet {
            liquid_assets: la,
            non_financial_sector_loan: nfl,
            interbank_loan: ib,
            discount_window_loan: dw,
            deposits: dep,
        }
    }

    #[test]
    fn test_interbank_split_by_sign() {
        let creditor = sheet(5.0, 80.0, 10.0, 0.0, -90.0);
        assert_eq!(creditor.assets(), 95.0);
        assert_eq!(creditor.liabilities(), -90.0);

        let debtor = sheet(5.0, 80.0, -10.0, 0.0, -70.0);
        assert_eq!(debtor.assets(), 85.0);
        assert_eq!(debtor.liabilities(), -80.0);
    }

    #[test]
    fn test_positive_capital_is_insolvent() {
        let broke = sheet(0.0, 50.0, -20.0, -10.0, -40.0);
        assert_eq!(broke.capital(), 20.0);
        assert!(broke.is_insolvent());
        assert!(!broke.is_solvent());
        assert!(broke.identity_holds(1e-12));
    }

    #[test]
    fn test_zero_capital_counts_as_solvent() {
        let flat = sheet(10.0, 0.0, 0.0, 0.0, -10.0);
        assert!(flat.is_solvent());
    }

    #[test]
    fn test_non_finite_account_detected() {
        let bad = sheet(f64::NAN, 1.0, 0.0, 0.0, -1.0);
        assert_eq!(bad.first_non_finite(), Some(Account::LiquidAssets));
        assert_eq!(sheet(1.0, 1.0, 0.0, 0.0, -1.0).first_non_finite(), None);
    }
}
