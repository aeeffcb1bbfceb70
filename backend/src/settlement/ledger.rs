//! Interbank ledger
//!
//! Dense N×N matrix of bilateral positions. Row `i` holds bank `i`'s
//! claims (positive) and debts (negative) against every other bank, so a
//! bank's net interbank position is its row sum.
//!
//! # Invariant
//!
//! The matrix is antisymmetric: `get(i, j) == -get(j, i)`. Every mutation
//! writes both cells.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterbankLedger {
    size: usize,
    cells: Vec<f64>,
}

impl InterbankLedger {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.cells[row * self.size + column]
    }

    fn set(&mut self, row: usize, column: usize, value: f64) {
        self.cells[row * self.size + column] = value;
    }

    /// Book `amount` lent from `lender` to `borrower`
    pub fn record_trade(&mut self, lender: usize, borrower: usize, amount: f64) {
        let lent = self.get(lender, borrower) + amount;
        self.set(lender, borrower, lent);
        self.set(borrower, lender, -lent);
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Net interbank position of bank `row`
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }

    /// Scale every position (interest accrual)
    pub fn scale(&mut self, factor: f64) {
        for cell in &mut self.cells {
            *cell *= factor;
        }
    }

    /// Scale one bank's row and mirror the negated values into its column
    pub fn scale_row_mirrored(&mut self, row: usize, factor: f64) {
        for column in 0..self.size {
            let scaled = self.get(row, column) * factor;
            self.set(row, column, scaled);
            if column != row {
                self.set(column, row, -scaled);
            }
        }
    }

    /// Sum of every cell; zero for an antisymmetric matrix
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Sum of all positive cells (gross claims outstanding)
    pub fn gross_claims(&self) -> f64 {
        self.cells.iter().filter(|cell| **cell > 0.0).sum()
    }

    pub fn is_antisymmetric(&self, tolerance: f64) -> bool {
        (0..self.size).all(|i| {
            (i..self.size).all(|j| (self.get(i, j) + self.get(j, i)).abs() <= tolerance)
        })
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0.0);
    }
}
