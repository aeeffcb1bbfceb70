//! Cycle bookkeeping and construction-time identity allocation

pub mod identity;
pub mod time;
