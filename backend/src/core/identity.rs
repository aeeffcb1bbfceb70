//! Construction-time identity allocation
//!
//! Identities are handed out by an issuer owned by the composition root.
//! Nothing allocates identities once the model starts cycling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of any agent in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:06}", self.0)
    }
}

/// Monotonic identity allocator
///
/// # Example
/// ```
/// use banksim_core::IdentityIssuer;
///
/// let mut ids = IdentityIssuer::new();
/// let a = ids.issue();
/// let b = ids.issue();
/// assert!(b > a);
/// assert_eq!(ids.issued(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentityIssuer {
    next: u64,
}

impl IdentityIssuer {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next identity
    pub fn issue(&mut self) -> AgentId {
        if self.next == 0 {
            self.next = 1;
        }
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// Number of identities handed out so far
    pub fn issued(&self) -> u64 {
        self.next.saturating_sub(1)
    }
}
