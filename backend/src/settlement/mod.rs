//! Settlement Module
//!
//! Interbank plumbing run by the clearing house:
//! - Double-queue matching of liquidity surplus against deficit
//! - Collateral guarantee waterfall (optional facility)
//! - Default contagion across the ledger
//!
//! # Critical Invariants
//!
//! 1. **Antisymmetry**: `ledger[i][j] == -ledger[j][i]` after every operation
//! 2. **Single writer**: only [`ClearingHouse`] mutates the ledger and
//!    the banks' interbank positions
//! 3. **Conservation**: matching never creates value; contagion reduces
//!    creditor claims by exactly the debtor-side reduction
//!
//! # Example
//!
//! ```rust
//! use banksim_core::{Bank, BankStrategy, IdentityIssuer, RngManager};
//! use banksim_core::orchestrator::config::InterbankPriority;
//! use banksim_core::settlement::ClearingHouse;
//!
//! let mut ids = IdentityIssuer::new();
//! let mut banks: Vec<Bank> = (0..2)
//!     .map(|i| Bank::new(ids.issue(), i, 1.0, BankStrategy::new(0.08, 0.10), false))
//!     .collect();
//! banks[0].set_liquidity_needs(15.0);
//! banks[1].set_liquidity_needs(-10.0);
//!
//! let mut house = ClearingHouse::new(2, false, InterbankPriority::Random);
//! let trades = house.organize_interbank_market(&mut banks, &mut RngManager::new(1));
//!
//! assert_eq!(trades[0].amount, 10.0);
//! assert_eq!(banks[1].liquidity_needs(), 0.0);
//! ```

pub mod clearing_house;
pub mod collateral;
pub mod contagion;
pub mod ledger;
pub mod matching;

// Re-export public API
pub use clearing_house::{ClearingHouse, ContagionOutcome};
pub use collateral::{CollateralPledge, GuaranteeTotals};
pub use ledger::InterbankLedger;
pub use matching::InterbankTrade;
