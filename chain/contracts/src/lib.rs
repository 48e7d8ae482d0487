//! Contract Logic for Pooled Presale Contributions
//!
//! This crate implements a presale pool: many participants deposit native
//! funds, the committed part is forwarded to a presale, and the pool then
//! either records the derivative token or redistributes a refund.
//!
//! # Modules
//! - `errors`: Contract-specific error types
//! - `events`: Pool events appended by every successful mutation
//! - `security`: Role checks and the forwarding re-entrancy lock
//! - `config`: Pool configuration and contribution caps
//! - `ledger`: Deposits and first-come-first-served cap allocation
//! - `lifecycle`: Pool state machine
//! - `pool`: The `PresalePool` contract instance
//! - `settlement`: Forwarding to the presale and refund distribution
//! - `withdrawal`: Claimable balances and payouts
//! - `transfer`: Outbound value-transfer seam
//! - `commitment`: Ledger snapshots and state digests
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod errors;
pub mod events;
pub mod security;
pub mod config;
pub mod ledger;
pub mod lifecycle;
pub mod pool;
pub mod settlement;
pub mod withdrawal;
pub mod transfer;
pub mod commitment;

pub use pool::PresalePool;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
