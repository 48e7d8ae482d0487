//! Participant balance types
//!
//! Invariant: total_deposited = contribution + remaining

use crate::amount::Amount;
use crate::ids::Address;
use serde::{Deserialize, Serialize};

/// Per-participant ledger record.
///
/// Created on first deposit and never removed. While the pool is Open a
/// withdrawal releases `remaining` by shrinking the deposit itself; after
/// that, payouts accumulate in `withdrawn` against a fixed entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub address: Address,
    /// Index in first-deposit order
    pub position: usize,
    /// Deposits still held by the pool; shrinks only on an Open withdrawal
    pub total_deposited: Amount,
    /// Committed portion, forwarded to the presale
    pub contribution: Amount,
    /// Uncommitted portion, always owed back
    pub remaining: Amount,
    /// Pro-rata share of a refund payment
    pub refund: Amount,
    /// Cumulative payouts once the pool has left Open, never decreases
    pub withdrawn: Amount,
}

impl ParticipantBalance {
    /// Create an empty record at the given first-deposit position
    pub fn new(address: Address, position: usize) -> Self {
        Self {
            address,
            position,
            total_deposited: 0,
            contribution: 0,
            remaining: 0,
            refund: 0,
            withdrawn: 0,
        }
    }

    /// Check balance invariant: total_deposited = contribution + remaining
    pub fn check_invariant(&self) -> bool {
        self.contribution
            .checked_add(self.remaining)
            .is_some_and(|sum| sum == self.total_deposited)
    }
}
