//! Domain models for the banking network

pub mod balance_sheet;
pub mod bank;
pub mod central_bank;
pub mod corporate_client;
pub mod depositor;
pub mod event;

// Re-exports
pub use balance_sheet::{Account, BalanceSheet};
pub use bank::{Bank, LiquidationOutcome, ProfitParams};
pub use central_bank::{Bailout, CentralBank};
pub use corporate_client::CorporateClient;
pub use depositor::{Deposit, Depositor, ShockParams};
pub use event::{Event, EventLog};

/// Per-cycle lifecycle hook shared by every agent kind
///
/// Called once at the start of each cycle, before period 0, to clear
/// transient per-cycle fields.
pub trait CycleAgent {
    fn reset_cycle(&mut self);
}
