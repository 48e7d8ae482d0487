//! Lifecycle State Machine
//!
//! Tracks the pool phase and rejects operations attempted in the wrong one.
//! Legal edges are defined by `PoolState::can_transition_to`; anything else,
//! including re-entering a terminal state, fails with `IllegalState`.

use tracing::info;
use types::state::PoolState;

use crate::errors::PoolError;

#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: PoolState,
}

impl Lifecycle {
    /// Pools start Open.
    pub fn new() -> Self {
        Self {
            state: PoolState::Open,
        }
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Reject unless the pool is in `allowed`.
    pub fn ensure(&self, operation: &'static str, allowed: PoolState) -> Result<(), PoolError> {
        self.ensure_any(operation, &[allowed])
    }

    /// Reject unless the pool is in one of `allowed`.
    pub fn ensure_any(
        &self,
        operation: &'static str,
        allowed: &[PoolState],
    ) -> Result<(), PoolError> {
        if !allowed.contains(&self.state) {
            return Err(PoolError::IllegalState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Reject once allocation is frozen, i.e. anywhere but Open.
    pub fn ensure_allocation_open(&self, operation: &'static str) -> Result<(), PoolError> {
        if self.state.allocation_frozen() {
            return Err(PoolError::IllegalState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Move to `next`, returning the previous state.
    pub(crate) fn transition(
        &mut self,
        operation: &'static str,
        next: PoolState,
    ) -> Result<PoolState, PoolError> {
        if !self.state.can_transition_to(next) {
            return Err(PoolError::IllegalState {
                operation,
                state: self.state,
            });
        }
        let previous = std::mem::replace(&mut self.state, next);
        info!(from = %previous, to = %next, operation, "pool state transition");
        Ok(previous)
    }

    /// Undo a transition whose external effect failed.
    pub(crate) fn revert_to(&mut self, previous: PoolState) {
        info!(from = %self.state, to = %previous, "pool state reverted");
        self.state = previous;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
