//! Corporate client (borrowing firm)
//!
//! Each client holds one loan from its owning bank. At the end of a cycle
//! the client either repays principal plus interest or defaults and repays
//! only what survives the loss-given-default.

use crate::core::identity::AgentId;
use crate::orchestrator::config::ClientTerms;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

use super::CycleAgent;

/// A firm borrowing from exactly one bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateClient {
    id: AgentId,
    /// Outstanding loan (principal, or amount repaid after collection)
    loan_amount: f64,
    /// Repaid / lent ratio of the last collection
    percentage_repaid: f64,
    default_rate: f64,
    loss_given_default: f64,
    loan_interest_rate: f64,
}

impl CorporateClient {
    pub fn new(id: AgentId, terms: ClientTerms) -> Self {
        Self {
            id,
            loan_amount: 0.0,
            percentage_repaid: 0.0,
            default_rate: terms.default_rate,
            loss_given_default: terms.loss_given_default,
            loan_interest_rate: terms.loan_interest_rate,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn loan_amount(&self) -> f64 {
        self.loan_amount
    }

    pub fn set_loan_amount(&mut self, amount: f64) {
        self.loan_amount = amount;
    }

    /// Multiply the outstanding loan by `factor`
    pub fn scale_loan(&mut self, factor: f64) {
        self.loan_amount *= factor;
    }

    pub fn percentage_repaid(&self) -> f64 {
        self.percentage_repaid
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn loss_given_default(&self) -> f64 {
        self.loss_given_default
    }

    pub fn loan_interest_rate(&self) -> f64 {
        self.loan_interest_rate
    }

    /// Settle the loan for this cycle and return the amount repaid
    ///
    /// Defaults with probability `default_rate`. One uniform draw per call.
    pub fn repay(&mut self, rng: &mut RngManager) -> f64 {
        let defaulted = rng.next_f64() <= self.default_rate;
        let amount_paid = if defaulted {
            self.loan_amount * (1.0 - self.loss_given_default)
        } else {
            self.loan_amount * (1.0 + self.loan_interest_rate)
        };
        self.percentage_repaid = if self.loan_amount == 0.0 {
            0.0
        } else {
            amount_paid / self.loan_amount
        };
        self.loan_amount = amount_paid;
        amount_paid
    }
}

impl CycleAgent for CorporateClient {
    fn reset_cycle(&mut self) {
        self.percentage_repaid = 0.0;
    }
}
