//! Pool lifecycle phases
//!
//! ```text
//! Open ──► Paid ──► TokenDistribution
//!   │        │
//!   └──► Failed ◄┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a pool.
///
/// Numeric codes are stable and match the on-chain encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoolState {
    /// Accepting deposits; allocation may still change
    Open = 0,
    /// Terminal: participants reclaim deposits or refunds
    Failed = 1,
    /// Committed funds forwarded; allocation frozen
    Paid = 2,
    /// Terminal: derivative token recorded
    TokenDistribution = 3,
}

impl PoolState {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::TokenDistribution)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: PoolState) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Paid)
                | (Self::Open, Self::Failed)
                | (Self::Paid, Self::Failed)
                | (Self::Paid, Self::TokenDistribution)
        )
    }

    /// Deposits and cap changes are only accepted while this is false.
    pub fn allocation_frozen(self) -> bool {
        self != Self::Open
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::Failed => "Failed",
            Self::Paid => "Paid",
            Self::TokenDistribution => "TokenDistribution",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PoolState; 4] = [
        PoolState::Open,
        PoolState::Failed,
        PoolState::Paid,
        PoolState::TokenDistribution,
    ];

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(PoolState::Open.code(), 0);
        assert_eq!(PoolState::Failed.code(), 1);
        assert_eq!(PoolState::Paid.code(), 2);
        assert_eq!(PoolState::TokenDistribution.code(), 3);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_allocation_frozen_outside_open() {
        for state in ALL {
            assert_eq!(state.allocation_frozen(), state != PoolState::Open);
        }
    }

    #[test]
    fn test_lifecycle_edges() {
        assert!(PoolState::Open.can_transition_to(PoolState::Paid));
        assert!(PoolState::Open.can_transition_to(PoolState::Failed));
        assert!(PoolState::Paid.can_transition_to(PoolState::Failed));
        assert!(PoolState::Paid.can_transition_to(PoolState::TokenDistribution));
        assert!(!PoolState::Open.can_transition_to(PoolState::TokenDistribution));
        assert!(!PoolState::Paid.can_transition_to(PoolState::Open));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&PoolState::TokenDistribution).unwrap();
        assert_eq!(json, "\"TokenDistribution\"");
        let state: PoolState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, PoolState::TokenDistribution);
    }
}
