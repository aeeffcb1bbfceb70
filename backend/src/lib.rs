//! Banking Network Simulator Core
//!
//! Discrete-cycle, multi-agent model of a banking network for studying
//! systemic risk: bank insolvency, interbank contagion, and the effect of
//! regulatory policy (capital requirements, discount-window lending,
//! deposit insurance, interbank collateral guarantees).
//!
//! # Architecture
//!
//! - **core**: Cycle clock and identity allocation
//! - **models**: Balance sheets and the agents (banks, depositors,
//!   corporate clients, central bank)
//! - **strategy**: Adaptive (EWA) strategy selection
//! - **settlement**: Clearing house (matching, collateral, contagion)
//! - **orchestrator**: Configuration, population, cycle loop, reporting
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. `capital = -(sum of the five accounts)`; `capital > 0` means insolvent
//! 2. All randomness is deterministic (one seeded RNG per model)
//! 3. The interbank ledger is antisymmetric and written only by the
//!    clearing house

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod settlement;
pub mod strategy;

// Re-exports for convenience
pub use core::identity::{AgentId, IdentityIssuer};
pub use core::time::{CycleClock, Period};
pub use models::{
    balance_sheet::{Account, BalanceSheet},
    bank::Bank,
    central_bank::CentralBank,
    corporate_client::CorporateClient,
    depositor::Depositor,
    event::{Event, EventLog},
};
pub use orchestrator::{
    CycleReport, InterbankPriority, ModelConfig, Orchestrator, RunSummary, ScenarioPreset,
    SimulationError,
};
pub use rng::RngManager;
pub use settlement::ClearingHouse;
pub use strategy::{BankStrategy, CentralBankStrategy, DepositorStrategy, StrategyPool};
