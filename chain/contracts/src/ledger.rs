//! Contribution Ledger — deposits, caps, and committed/uncommitted split
//!
//! Each participant's deposit is split into a committed `contribution` and
//! an uncommitted `remaining`. Allocation is first-come-first-served: when
//! caps change, participants are re-allocated in the order they first
//! deposited, and whoever arrives after the pool cap is exhausted keeps
//! their funds uncommitted.
//!
//! The ledger enforces no lifecycle rules; `PresalePool` decides when each
//! operation is legal. Every mutating method computes its full result
//! before writing, so an `Err` leaves the ledger unchanged.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;
use types::account::ParticipantBalance;
use types::amount::{mul_div_floor, Amount};
use types::ids::Address;

use crate::config::ContributionSettings;
use crate::errors::PoolError;

/// Per-participant balances plus cached aggregates.
#[derive(Debug, Clone)]
pub struct ContributionLedger {
    /// Records keyed by address
    participants: HashMap<Address, ParticipantBalance>,
    /// Addresses in first-deposit order
    order: Vec<Address>,
    settings: ContributionSettings,
    total_deposited: Amount,
    total_contribution: Amount,
    total_remaining: Amount,
}

impl ContributionLedger {
    pub fn new(settings: ContributionSettings) -> Self {
        Self {
            participants: HashMap::new(),
            order: Vec::new(),
            settings,
            total_deposited: 0,
            total_contribution: 0,
            total_remaining: 0,
        }
    }

    // ───────────────────────── Deposits ─────────────────────────

    /// Record a deposit and re-allocate the depositor only.
    ///
    /// The new funds start uncommitted; the depositor is then given as much
    /// committed headroom as the caps allow, without disturbing anyone else.
    pub fn deposit(
        &mut self,
        participant: &Address,
        amount: Amount,
    ) -> Result<&ParticipantBalance, PoolError> {
        if amount == 0 {
            return Err(PoolError::InsufficientPayment {
                required: 1,
                provided: 0,
            });
        }

        let (deposited, contribution, remaining) = self
            .participants
            .get(participant)
            .map(|r| (r.total_deposited, r.contribution, r.remaining))
            .unwrap_or((0, 0, 0));

        let new_deposited = deposited.checked_add(amount).ok_or(PoolError::Overflow)?;
        let new_total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;

        let others = self.total_contribution - contribution;
        let headroom = self.settings.pool_cap.saturating_sub(others);
        let new_contribution = self.allocate(new_deposited, headroom);
        let new_remaining = new_deposited - new_contribution;

        let new_total_contribution = others
            .checked_add(new_contribution)
            .ok_or(PoolError::Overflow)?;
        let new_total_remaining = (self.total_remaining - remaining)
            .checked_add(new_remaining)
            .ok_or(PoolError::Overflow)?;

        // Commit
        self.total_deposited = new_total_deposited;
        self.total_contribution = new_total_contribution;
        self.total_remaining = new_total_remaining;

        let record = match self.participants.entry(participant.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let position = self.order.len();
                self.order.push(participant.clone());
                entry.insert(ParticipantBalance::new(participant.clone(), position))
            }
        };
        record.total_deposited = new_deposited;
        record.contribution = new_contribution;
        record.remaining = new_remaining;
        Ok(record)
    }

    // ───────────────────────── Allocation ─────────────────────────

    /// Replace the caps and re-allocate every participant in first-deposit order.
    pub fn set_settings(&mut self, settings: ContributionSettings) -> Result<(), PoolError> {
        settings.validate()?;

        let mut committed: Amount = 0;
        let mut allocations = Vec::with_capacity(self.order.len());
        for address in &self.order {
            let Some(record) = self.participants.get(address) else {
                continue;
            };
            let headroom = settings.pool_cap.saturating_sub(committed);
            let contribution = Self::allocate_with(&settings, record.total_deposited, headroom);
            committed = committed
                .checked_add(contribution)
                .ok_or(PoolError::Overflow)?;
            allocations.push((address.clone(), contribution));
        }

        self.settings = settings;
        self.total_contribution = 0;
        self.total_remaining = 0;
        for (address, contribution) in allocations {
            if let Some(record) = self.participants.get_mut(&address) {
                record.contribution = contribution;
                record.remaining = record.total_deposited - contribution;
                self.total_contribution += record.contribution;
                self.total_remaining += record.remaining;
                debug!(
                    participant = %address,
                    contribution = record.contribution,
                    remaining = record.remaining,
                    "re-allocated participant"
                );
            }
        }
        Ok(())
    }

    fn allocate(&self, deposited: Amount, headroom: Amount) -> Amount {
        Self::allocate_with(&self.settings, deposited, headroom)
    }

    /// Committed share of `deposited` given the caps and the remaining pool headroom.
    ///
    /// Anything below the minimum is not committed at all.
    fn allocate_with(settings: &ContributionSettings, deposited: Amount, headroom: Amount) -> Amount {
        let capped = deposited.min(settings.max_contribution).min(headroom);
        if deposited < settings.min_contribution || capped < settings.min_contribution {
            0
        } else {
            capped
        }
    }

    // ───────────────────────── Refunds ─────────────────────────

    /// Credit `payment` pro rata by frozen contribution.
    ///
    /// Returns the sum actually credited; `payment` minus that sum is the
    /// truncation dust, which no participant can claim.
    pub fn credit_refunds(&mut self, payment: Amount) -> Result<Amount, PoolError> {
        let total = self.total_contribution;
        let mut credits = Vec::with_capacity(self.order.len());
        let mut distributed: Amount = 0;
        for address in &self.order {
            let Some(record) = self.participants.get(address) else {
                continue;
            };
            let share = if total == 0 {
                0
            } else {
                mul_div_floor(payment, record.contribution, total).ok_or(PoolError::Overflow)?
            };
            distributed = distributed.checked_add(share).ok_or(PoolError::Overflow)?;
            credits.push((address.clone(), share));
        }

        for (address, share) in credits {
            if let Some(record) = self.participants.get_mut(&address) {
                record.refund = share;
            }
        }
        Ok(distributed)
    }

    // ───────────────────────── Withdrawals ─────────────────────────

    /// Pay `amount` of uncommitted funds back while allocation is still open.
    ///
    /// The deposit shrinks together with `remaining`, so a later re-allocation
    /// only sees what the pool still holds.
    pub(crate) fn release_remaining(
        &mut self,
        participant: &Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        let total_deposited = self.total_deposited.checked_sub(amount).ok_or(PoolError::Overflow)?;
        let total_remaining = self.total_remaining.checked_sub(amount).ok_or(PoolError::Overflow)?;
        let Some(record) = self.participants.get_mut(participant) else {
            return Ok(());
        };
        let remaining = record.remaining.checked_sub(amount).ok_or(PoolError::Overflow)?;
        let deposited = record.total_deposited.checked_sub(amount).ok_or(PoolError::Overflow)?;

        record.remaining = remaining;
        record.total_deposited = deposited;
        self.total_remaining = total_remaining;
        self.total_deposited = total_deposited;
        debug!(participant = %participant, amount, remaining, "released uncommitted funds");
        Ok(())
    }

    /// Undo a `release_remaining` whose transfer did not go through.
    pub(crate) fn restore_remaining(&mut self, participant: &Address, amount: Amount) {
        if let Some(record) = self.participants.get_mut(participant) {
            record.remaining += amount;
            record.total_deposited += amount;
            self.total_remaining += amount;
            self.total_deposited += amount;
        }
    }

    pub(crate) fn record_withdrawal(
        &mut self,
        participant: &Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        // Unknown participants never have anything to withdraw
        let Some(record) = self.participants.get_mut(participant) else {
            return Ok(());
        };
        record.withdrawn = record
            .withdrawn
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// Undo a `record_withdrawal` whose transfer did not go through.
    pub(crate) fn revert_withdrawal(&mut self, participant: &Address, amount: Amount) {
        if let Some(record) = self.participants.get_mut(participant) {
            record.withdrawn = record.withdrawn.saturating_sub(amount);
        }
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn participant(&self, address: &Address) -> Option<&ParticipantBalance> {
        self.participants.get(address)
    }

    /// Participants in first-deposit order.
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantBalance> {
        self.order
            .iter()
            .filter_map(|address| self.participants.get(address))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn settings(&self) -> &ContributionSettings {
        &self.settings
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    pub fn total_contribution(&self) -> Amount {
        self.total_contribution
    }

    pub fn total_remaining(&self) -> Amount {
        self.total_remaining
    }

    /// Verify per-participant and aggregate conservation.
    pub fn check_invariants(&self) -> bool {
        let mut contribution: Amount = 0;
        let mut remaining: Amount = 0;
        let mut deposited: Amount = 0;
        for record in self.participants() {
            if !record.check_invariant() {
                return false;
            }
            let sums = (
                contribution.checked_add(record.contribution),
                remaining.checked_add(record.remaining),
                deposited.checked_add(record.total_deposited),
            );
            match sums {
                (Some(c), Some(r), Some(d)) => {
                    contribution = c;
                    remaining = r;
                    deposited = d;
                }
                _ => return false,
            }
        }
        self.participants.len() == self.order.len()
            && contribution == self.total_contribution
            && remaining == self.total_remaining
            && deposited == self.total_deposited
    }
}
