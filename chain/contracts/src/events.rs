//! Pool events
//!
//! Events are immutable records appended by every successful pool mutation.
//! Rejected calls never emit.

use serde::{Deserialize, Serialize};
use types::amount::Amount;
use types::ids::{Address, TokenRef};

/// Native funds received from a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub participant: Address,
    pub amount: Amount,
    /// Committed portion after re-allocation
    pub contribution: Amount,
    /// Uncommitted portion after re-allocation
    pub remaining: Amount,
}

/// Caps replaced and every participant re-allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSettingsChanged {
    pub min_contribution: Amount,
    pub max_contribution: Amount,
    pub pool_cap: Amount,
    pub total_contribution: Amount,
    pub total_remaining: Amount,
}

/// Committed funds sent to the presale (Open → Paid)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedToPresale {
    pub recipient: Address,
    pub amount: Amount,
}

/// Pool aborted by the admin before forwarding (Open → Failed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFailed {
    pub caller: Address,
}

/// Refund payment accepted and credited pro rata (Paid → Failed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundDistributed {
    pub caller: Address,
    pub payment: Amount,
    /// Sum of all credited refunds
    pub distributed: Amount,
    /// Truncation residue retained by the pool
    pub dust: Amount,
}

/// Derivative token recorded (Paid → TokenDistribution)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub token: TokenRef,
}

/// Claimable balance paid out to a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub participant: Address,
    pub amount: Amount,
}

/// Admin role handed over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTransferred {
    pub previous: Address,
    pub current: Address,
}

/// Enum wrapper for all pool events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Deposited(Deposited),
    ContributionSettingsChanged(ContributionSettingsChanged),
    ForwardedToPresale(ForwardedToPresale),
    PoolFailed(PoolFailed),
    RefundDistributed(RefundDistributed),
    TokenSet(TokenSet),
    Withdrawn(Withdrawn),
    AdminTransferred(AdminTransferred),
}
