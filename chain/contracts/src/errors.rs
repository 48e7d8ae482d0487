//! Contract-specific error types
//!
//! Every variant is returned synchronously and leaves the pool untouched.

use thiserror::Error;
use types::amount::Amount;
use types::ids::Address;
use types::state::PoolState;

/// Errors raised by pool operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("Illegal state: {operation} not permitted while pool is {state}")]
    IllegalState {
        operation: &'static str,
        state: PoolState,
    },

    #[error("Unauthorized: {caller} lacks the required role")]
    Unauthorized { caller: Address },

    #[error("Insufficient payment: required {required}, provided {provided}")]
    InsufficientPayment { required: Amount, provided: Amount },

    #[error("Transfer of {amount} to {to} failed: {reason}")]
    TransferFailure {
        to: Address,
        amount: Amount,
        reason: String,
    },

    #[error("Invalid contribution settings: min {min} exceeds max {max}")]
    InvalidContributionSettings { min: Amount, max: Amount },

    #[error("Reentrancy detected: {operation} called while forwarding is in flight")]
    Reentrancy { operation: &'static str },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Rejection reported by the value-transfer primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct TransferError {
    pub reason: String,
}

impl TransferError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading pool configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed pool config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] PoolError),
}
