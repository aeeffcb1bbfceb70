//! Interbank market clearing
//!
//! Double-queue greedy matching. Banks with a liquidity surplus queue up
//! as lenders, banks with a deficit (or exactly zero needs) as borrowers.
//! The heads of both queues trade `min(offer, |request|)`; whichever side
//! is exhausted advances. The walk ends when either queue runs out.

use crate::models::bank::Bank;
use crate::orchestrator::config::InterbankPriority;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::ledger::InterbankLedger;

/// One matched interbank loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterbankTrade {
    pub lender: usize,
    pub borrower: usize,
    pub amount: f64,
}

/// Split banks into `(offering, needing)` queues of ledger indices
///
/// Seeds each bank's remaining amount with its current liquidity needs.
pub fn build_queues(banks: &mut [Bank]) -> (Vec<usize>, Vec<usize>) {
    let mut offering = Vec::new();
    let mut needing = Vec::new();
    for (position, bank) in banks.iter_mut().enumerate() {
        let needs = bank.liquidity_needs();
        let scratch = bank.interbank_mut();
        scratch.amount_left = needs;
        scratch.counterparty = None;
        if needs <= 0.0 {
            needing.push(position);
        } else {
            offering.push(position);
        }
    }
    (offering, needing)
}

/// Order both queues and stamp each bank's priority rank
pub fn order_queues(
    banks: &mut [Bank],
    offering: &mut [usize],
    needing: &mut [usize],
    priority: InterbankPriority,
    rng: &mut RngManager,
) {
    match priority {
        InterbankPriority::Random => {
            rng.shuffle(offering);
            rng.shuffle(needing);
        }
        InterbankPriority::RiskSorted => {
            sort_by_risk(banks, offering);
            sort_by_risk(banks, needing);
        }
    }

    for queue in [&*offering, &*needing] {
        for (rank, &position) in queue.iter().enumerate() {
            banks[position].interbank_mut().priority_order = rank;
        }
    }
}

/// Stable descending sort by the chosen (capital, liquidity) ratios
fn sort_by_risk(banks: &[Bank], queue: &mut [usize]) {
    queue.sort_by(|&a, &b| {
        let key_a = banks[a].current_strategy().risk_key();
        let key_b = banks[b].current_strategy().risk_key();
        key_b.partial_cmp(&key_a).unwrap_or(Ordering::Equal)
    });
}

/// Greedy walk over both queues, booking every trade in the ledger
pub fn match_queues(
    ledger: &mut InterbankLedger,
    banks: &mut [Bank],
    offering: &[usize],
    needing: &[usize],
) -> Vec<InterbankTrade> {
    let mut trades = Vec::new();
    let (mut next_lender, mut next_borrower) = (0, 0);

    while next_lender < offering.len() && next_borrower < needing.len() {
        let lender = offering[next_lender];
        let borrower = needing[next_borrower];

        let offered = banks[lender].interbank().amount_left;
        let requested = banks[borrower].interbank().amount_left.abs();
        let amount = offered.min(requested);

        if amount > 0.0 {
            let lender_scratch = banks[lender].interbank_mut();
            lender_scratch.amount_left -= amount;
            lender_scratch.counterparty = Some(borrower);

            let borrower_scratch = banks[borrower].interbank_mut();
            borrower_scratch.amount_left += amount;
            borrower_scratch.counterparty = Some(lender);

            ledger.record_trade(lender, borrower, amount);
            trades.push(InterbankTrade {
                lender,
                borrower,
                amount,
            });
        }

        if banks[lender].interbank().amount_left == 0.0 {
            next_lender += 1;
        }
        if banks[borrower].interbank().amount_left == 0.0 {
            next_borrower += 1;
        }
    }
    trades
}

/// Write matched positions back onto every balance sheet
///
/// Unplaced lending returns to liquid assets; borrowed funds paid
/// depositors; whatever is still unmet becomes the bank's liquidity needs.
pub fn settle_positions(ledger: &InterbankLedger, banks: &mut [Bank]) {
    for (position, bank) in banks.iter_mut().enumerate() {
        bank.set_interbank_position(ledger.row_sum(position));

        if bank.offers_liquidity() {
            let leftover = bank.interbank().amount_left;
            bank.sheet_mut().liquid_assets = leftover;
            bank.interbank_mut().amount_left = 0.0;
        }

        let sheet = bank.sheet_mut();
        if sheet.is_interbank_debtor() {
            sheet.deposits -= sheet.interbank_loan;
        }

        let unmet = bank.interbank().amount_left;
        bank.set_liquidity_needs(unmet);
    }
}
