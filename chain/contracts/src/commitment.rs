//! Ledger snapshots and state digests
//!
//! A snapshot is the complete observable pool state: aggregates, roles and
//! every participant record in first-deposit order. Its SHA-256 digest over
//! canonical JSON lets two replicas, or an auditor, confirm they hold the
//! same ledger without exchanging it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::account::ParticipantBalance;
use types::amount::Amount;
use types::ids::{Address, PoolId, TokenRef};
use types::state::PoolState;

use crate::config::ContributionSettings;
use crate::pool::PresalePool;

/// Serializable view of the whole pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: PoolId,
    pub state: PoolState,
    pub admin: Address,
    pub presale_recipient: Option<Address>,
    pub token: Option<TokenRef>,
    pub settings: ContributionSettings,
    pub total_contribution: Amount,
    pub total_remaining: Amount,
    pub amount_forwarded: Amount,
    pub refund_received: Amount,
    pub refund_dust: Amount,
    pub custody: Amount,
    pub participants: Vec<ParticipantBalance>,
}

impl PoolSnapshot {
    /// SHA-256 over the snapshot's JSON encoding.
    pub fn digest(&self) -> Result<[u8; 32], serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(compute_hash(&bytes))
    }
}

impl PresalePool {
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: self.pool_id,
            state: self.state(),
            admin: self.admin().clone(),
            presale_recipient: self.presale_recipient().cloned(),
            token: self.token.clone(),
            settings: *self.settings(),
            total_contribution: self.total_contribution(),
            total_remaining: self.total_remaining(),
            amount_forwarded: self.amount_forwarded,
            refund_received: self.refund_received,
            refund_dust: self.refund_dust,
            custody: self.custody,
            participants: self.participants().cloned().collect(),
        }
    }

    /// Digest of the current snapshot.
    pub fn state_digest(&self) -> Result<[u8; 32], serde_json::Error> {
        self.snapshot().digest()
    }
}

/// Compute SHA-256 hash of arbitrary data.
pub fn compute_hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
