//! Outbound value transfer
//!
//! The hosting runtime moves native funds out of the pool through
//! `ValueTransfer`. The transfer receives the pool itself, because a real
//! recipient can call back into the pool before the outbound call returns;
//! any implementation may do so.

use std::collections::{HashMap, HashSet};
use types::amount::Amount;
use types::ids::Address;

use crate::errors::TransferError;
use crate::pool::PresalePool;

/// Send native funds from the pool to an address.
pub trait ValueTransfer {
    fn send(
        &mut self,
        pool: &mut PresalePool,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

impl<F> ValueTransfer for F
where
    F: FnMut(&mut PresalePool, &Address, Amount) -> Result<(), TransferError>,
{
    fn send(
        &mut self,
        pool: &mut PresalePool,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self(pool, to, amount)
    }
}

/// In-memory transfer that records every payout.
///
/// Recipients can be marked as rejecting to simulate a contract that
/// refuses incoming funds.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransfer {
    payouts: Vec<(Address, Amount)>,
    received: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every transfer to `address` fail.
    pub fn reject(&mut self, address: Address) {
        self.rejecting.insert(address);
    }

    pub fn accept(&mut self, address: &Address) {
        self.rejecting.remove(address);
    }

    /// Total received by `address` across all payouts.
    pub fn received(&self, address: &Address) -> Amount {
        self.received.get(address).copied().unwrap_or(0)
    }

    /// Payouts in the order they were sent.
    pub fn payouts(&self) -> &[(Address, Amount)] {
        &self.payouts
    }

    pub fn total_sent(&self) -> Amount {
        self.payouts.iter().map(|(_, amount)| amount).sum()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn send(
        &mut self,
        _pool: &mut PresalePool,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            return Err(TransferError::new(format!("{to} rejected incoming funds")));
        }
        self.payouts.push((to.clone(), amount));
        *self.received.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }
}
