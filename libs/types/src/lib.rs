//! Types library for the presale contribution pool
//!
//! Shared vocabulary for the pool contracts: identities, native-asset
//! amounts, lifecycle states and per-participant balance views. Everything
//! here is plain data; the contract crate owns all behaviour.
//!
//! # Modules
//! - `ids`: Addresses, derivative token references, pool identifiers
//! - `amount`: Native-asset amounts and checked pro-rata arithmetic
//! - `state`: Pool lifecycle phases
//! - `account`: Participant balance views
//! - `errors`: Error taxonomy

pub mod ids;
pub mod amount;
pub mod state;
pub mod account;
pub mod errors;
