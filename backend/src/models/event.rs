//! Event logging for run inspection and auditing.
//!
//! Every significant balance-sheet movement during a cycle is recorded as
//! a cycle-stamped [`Event`]. The log is append-only and lives in memory
//! for the length of a run.
//!
//! # Event Types
//!
//! Events are grouped by phase:
//! - **Setup**: strategy choice
//! - **Shock**: interbank loans, collateral, discount window, fire sales
//! - **Settle**: bailouts, insolvencies, liquidations, cycle summary
//!
//! Banks are identified by their dense ledger index.
//!
//! # Example
//!
//! ```rust
//! use banksim_core::models::event::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::InterbankLoan {
//!     cycle: 3,
//!     lender: 0,
//!     borrower: 1,
//!     amount: 0.25,
//! });
//!
//! assert_eq!(log.events_at_cycle(3).len(), 1);
//! assert_eq!(log.events_of_type("InterbankLoan").len(), 1);
//! ```

use serde::Serialize;

/// Simulation event capturing a state change.
///
/// Events are logged in the order they occur within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A learning agent picked its option for this cycle
    StrategyChosen {
        cycle: usize,
        /// Ledger index, or `None` for the central bank
        bank: Option<usize>,
        option_index: usize,
    },

    /// Matched interbank trade
    InterbankLoan {
        cycle: usize,
        lender: usize,
        borrower: usize,
        amount: f64,
    },

    /// Collateral seized from a debtor under the guarantee facility
    CollateralPledged {
        cycle: usize,
        bank: usize,
        collateral: f64,
        residual: f64,
    },

    /// Discount-window loan (non-positive amount)
    DiscountWindowLoan { cycle: usize, bank: usize, amount: f64 },

    /// Loans sold at a discount (book value)
    FireSale { cycle: usize, bank: usize, amount_sold: f64 },

    /// Too-big-to-fail injection
    Bailout {
        cycle: usize,
        bank: usize,
        liquidity: f64,
        capital: f64,
    },

    Insolvency { cycle: usize, bank: usize, capital: f64 },

    /// Bank pushed into insolvency by interbank haircuts
    ContagionInsolvency {
        cycle: usize,
        bank: usize,
        /// Net interbank position after the haircuts
        interbank_position: f64,
    },

    Liquidation {
        cycle: usize,
        bank: usize,
        available: f64,
        payout_ratio: f64,
    },

    /// End of cycle summary
    CycleCompleted {
        cycle: usize,
        insolvencies: usize,
        contagion_insolvencies: usize,
    },
}

impl Event {
    /// Cycle the event occurred in
    pub fn cycle(&self) -> usize {
        match self {
            Event::StrategyChosen { cycle, .. }
            | Event::InterbankLoan { cycle, .. }
            | Event::CollateralPledged { cycle, .. }
            | Event::DiscountWindowLoan { cycle, .. }
            | Event::FireSale { cycle, .. }
            | Event::Bailout { cycle, .. }
            | Event::Insolvency { cycle, .. }
            | Event::ContagionInsolvency { cycle, .. }
            | Event::Liquidation { cycle, .. }
            | Event::CycleCompleted { cycle, .. } => *cycle,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::StrategyChosen { .. } => "StrategyChosen",
            Event::InterbankLoan { .. } => "InterbankLoan",
            Event::CollateralPledged { .. } => "CollateralPledged",
            Event::DiscountWindowLoan { .. } => "DiscountWindowLoan",
            Event::FireSale { .. } => "FireSale",
            Event::Bailout { .. } => "Bailout",
            Event::Insolvency { .. } => "Insolvency",
            Event::ContagionInsolvency { .. } => "ContagionInsolvency",
            Event::Liquidation { .. } => "Liquidation",
            Event::CycleCompleted { .. } => "CycleCompleted",
        }
    }

    /// Ledger index of the bank the event concerns, if any
    ///
    /// Interbank loans report the borrower.
    pub fn bank(&self) -> Option<usize> {
        match self {
            Event::StrategyChosen { bank, .. } => *bank,
            Event::InterbankLoan { borrower, .. } => Some(*borrower),
            Event::CollateralPledged { bank, .. }
            | Event::DiscountWindowLoan { bank, .. }
            | Event::FireSale { bank, .. }
            | Event::Bailout { bank, .. }
            | Event::Insolvency { bank, .. }
            | Event::ContagionInsolvency { bank, .. }
            | Event::Liquidation { bank, .. } => Some(*bank),
            Event::CycleCompleted { .. } => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific cycle
    pub fn events_at_cycle(&self, cycle: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.cycle() == cycle).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific bank
    pub fn events_for_bank(&self, bank: usize) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.bank() == Some(bank))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
