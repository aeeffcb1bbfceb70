//! Cycle and period bookkeeping for the simulation
//!
//! The model advances in discrete cycles. Each cycle is split into three
//! barrier periods (setup, shock, settle). This module tracks where the
//! scheduler currently is.

use serde::{Deserialize, Serialize};

/// One of the three barrier periods of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// period_0: reset, strategy selection, balance-sheet rebuild
    Setup,
    /// period_1: liquidity shock, interbank funding, central-bank backstop
    Shock,
    /// period_2: interest, collection, contagion, learning, liquidation
    Settle,
}

impl Period {
    /// Periods in execution order
    pub const ORDER: [Period; 3] = [Period::Setup, Period::Shock, Period::Settle];

    /// Numeric index as used in the literature (0, 1, 2)
    pub fn index(self) -> usize {
        match self {
            Period::Setup => 0,
            Period::Shock => 1,
            Period::Settle => 2,
        }
    }
}

/// Tracks the current cycle and period
///
/// # Example
/// ```
/// use banksim_core::{CycleClock, Period};
///
/// let mut clock = CycleClock::new();
/// assert_eq!(clock.current_cycle(), 0);
///
/// clock.advance_cycle();
/// clock.enter(Period::Setup);
/// clock.enter(Period::Shock);
/// assert_eq!(clock.current_cycle(), 1);
/// assert_eq!(clock.current_period(), Some(Period::Shock));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleClock {
    /// Cycles started since the model was built (0 = none yet)
    current_cycle: usize,
    /// Period currently executing, None between cycles
    current_period: Option<Period>,
}

impl CycleClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle
    pub fn advance_cycle(&mut self) {
        self.current_cycle += 1;
        self.current_period = None;
    }

    /// Mark a period as executing
    ///
    /// # Panics
    /// Panics if periods are entered out of order within a cycle.
    pub fn enter(&mut self, period: Period) {
        let expected = match self.current_period {
            None => 0,
            Some(p) => p.index() + 1,
        };
        assert_eq!(
            period.index(),
            expected,
            "period entered out of order: {:?} after {:?}",
            period,
            self.current_period
        );
        self.current_period = Some(period);
    }

    /// Mark the cycle as complete (between cycles)
    pub fn finish_cycle(&mut self) {
        self.current_period = None;
    }

    /// Get the current cycle (1-based once the first cycle has started)
    pub fn current_cycle(&self) -> usize {
        self.current_cycle
    }

    /// Get the period currently executing
    pub fn current_period(&self) -> Option<Period> {
        self.current_period
    }
}
