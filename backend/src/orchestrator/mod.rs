//! Orchestrator - composition root and cycle scheduler
//!
//! See `engine.rs` for the cycle loop, `population.rs` for how agents are
//! wired, and `config.rs` / `scenario.rs` for the exogenous factors.

pub mod config;
pub mod engine;
pub mod population;
pub mod report;
pub mod scenario;

// Re-export main types for convenience
pub use config::{
    BankSizeDistribution, CapitalRules, ClientTerms, ConfigError, InterbankPriority, ModelConfig,
};
pub use engine::{AgentKind, Orchestrator, SimulationError};
pub use population::{build_population, Population};
pub use report::{CycleReport, RunSummary};
pub use scenario::ScenarioPreset;
