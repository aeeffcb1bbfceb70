//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the model MUST go through this module, drawn from
//! the single instance owned by the orchestrator.

mod xorshift;

pub use xorshift::RngManager;
