//! Withdrawal Engine — releasing claimable balances
//!
//! What a participant may take out depends on how the pool resolved:
//!
//! | State | Entitlement |
//! |---|---|
//! | Open | `remaining` |
//! | Paid, TokenDistribution | `remaining` |
//! | Failed after refund | `remaining + refund` |
//! | Failed after abort | `total_deposited` |
//!
//! The claimable amount is `entitlement - withdrawn`. While the pool is Open
//! the payout shrinks the deposit itself instead of growing `withdrawn`, so
//! a later cap change re-allocates only what is still held. Payouts follow
//! checks-effects-interactions: the balance and custody are updated before
//! the transfer, so a recipient that calls back in sees nothing left to
//! claim. A refused transfer restores both.

use tracing::{debug, info, warn};
use types::account::ParticipantBalance;
use types::amount::Amount;
use types::ids::Address;
use types::state::PoolState;

use crate::errors::PoolError;
use crate::events::{PoolEvent, Withdrawn};
use crate::pool::PresalePool;
use crate::transfer::ValueTransfer;

impl PresalePool {
    /// Pay out everything `participant` can currently claim.
    ///
    /// Returns the amount transferred. Nothing owed is not an error: the
    /// call succeeds with zero and the transfer is never invoked.
    pub fn withdraw_all(
        &mut self,
        participant: &Address,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Amount, PoolError> {
        self.forwarding_guard.check("withdraw_all")?;

        let payable = self.claimable(participant);
        if payable == 0 {
            debug!(participant = %participant, "nothing to withdraw");
            return Ok(0);
        }
        let custody = self.custody.checked_sub(payable).ok_or(PoolError::Overflow)?;

        // Effects
        let open = !self.state().allocation_frozen();
        if open {
            self.ledger.release_remaining(participant, payable)?;
        } else {
            self.ledger.record_withdrawal(participant, payable)?;
        }
        self.custody = custody;

        // Interaction
        if let Err(e) = transfer.send(self, participant, payable) {
            if open {
                self.ledger.restore_remaining(participant, payable);
            } else {
                self.ledger.revert_withdrawal(participant, payable);
            }
            self.custody += payable;
            warn!(participant = %participant, amount = payable, reason = %e, "withdrawal transfer failed");
            return Err(PoolError::TransferFailure {
                to: participant.clone(),
                amount: payable,
                reason: e.reason,
            });
        }

        info!(participant = %participant, amount = payable, "withdrawal paid");
        self.events.push(PoolEvent::Withdrawn(Withdrawn {
            participant: participant.clone(),
            amount: payable,
        }));
        Ok(payable)
    }

    /// Amount `participant` could withdraw right now.
    pub fn claimable(&self, participant: &Address) -> Amount {
        self.ledger
            .participant(participant)
            .map(|record| self.entitlement(record).saturating_sub(record.withdrawn))
            .unwrap_or(0)
    }

    fn entitlement(&self, record: &ParticipantBalance) -> Amount {
        match self.state() {
            PoolState::Open | PoolState::Paid | PoolState::TokenDistribution => record.remaining,
            PoolState::Failed if self.refund_distributed() => {
                record.remaining.saturating_add(record.refund)
            }
            PoolState::Failed => record.total_deposited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransferError;
    use crate::transfer::RecordingTransfer;
    use types::ids::TokenRef;

    fn addr(s: &str) -> Address {
        Address::try_new(s).unwrap()
    }

    fn funded_pool() -> PresalePool {
        let mut pool = PresalePool::new(addr("admin"));
        pool.deposit(&addr("a"), 2).unwrap();
        pool.deposit(&addr("b"), 5).unwrap();
        pool.deposit(&addr("c"), 1).unwrap();
        pool.set_contribution_settings(&addr("admin"), 0, 2, 3).unwrap();
        pool
    }

    fn forward(pool: &mut PresalePool) {
        let mut transfer = RecordingTransfer::new();
        pool.forward_to_presale(&addr("admin"), addr("presale"), 0, &mut transfer)
            .unwrap();
    }

    #[test]
    fn test_withdraw_remaining_while_open() {
        let mut pool = PresalePool::new(addr("admin"));
        pool.deposit(&addr("a"), 5).unwrap();
        pool.set_contribution_settings(&addr("admin"), 0, 2, 10).unwrap();
        assert_eq!(pool.claimable(&addr("a")), 3);

        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("a"), &mut transfer), Ok(3));
        assert_eq!(transfer.received(&addr("a")), 3);
        assert_eq!(pool.state(), PoolState::Open);
        assert_eq!(pool.custody(), 2);

        let record = pool.participant(&addr("a")).unwrap();
        assert_eq!(record.total_deposited, 2);
        assert_eq!((record.contribution, record.remaining), (2, 0));
        assert!(pool.check_invariants());
    }

    #[test]
    fn test_open_withdraw_twice_second_is_zero() {
        let mut pool = funded_pool();
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(4));
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(0));
        assert_eq!(transfer.payouts().len(), 1);
        assert_eq!(pool.custody(), 4);
    }

    #[test]
    fn test_cap_change_after_open_withdraw_reallocates_what_is_held() {
        let mut pool = funded_pool();
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(4));
        assert_eq!(pool.withdraw_all(&addr("c"), &mut transfer), Ok(1));

        // Unbounded caps would have committed b's full 5 had it stayed
        pool.set_contribution_settings(&addr("admin"), 0, 100, 100).unwrap();
        assert_eq!(pool.total_contribution(), 3);
        assert_eq!(pool.total_remaining(), 0);
        assert_eq!(pool.custody(), 3);
        assert!(pool.check_invariants());

        forward(&mut pool);
        assert_eq!(pool.custody(), 0);
        pool.refund_presale(&addr("admin"), 3).unwrap();
        assert_eq!(pool.claimable(&addr("a")), 2);
        assert_eq!(pool.claimable(&addr("b")), 1);
        assert_eq!(pool.claimable(&addr("c")), 0);
    }

    #[test]
    fn test_rejected_open_withdraw_restores_deposit() {
        let mut pool = funded_pool();
        let before = pool.snapshot();
        let mut transfer = RecordingTransfer::new();
        transfer.reject(addr("b"));
        assert!(matches!(
            pool.withdraw_all(&addr("b"), &mut transfer),
            Err(PoolError::TransferFailure { amount: 4, .. })
        ));
        assert_eq!(pool.snapshot(), before);
    }

    #[test]
    fn test_withdraw_remaining_after_forward() {
        let mut pool = funded_pool();
        forward(&mut pool);
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("a"), &mut transfer), Ok(0));
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(4));
        assert_eq!(pool.withdraw_all(&addr("c"), &mut transfer), Ok(1));
        assert_eq!(pool.custody(), 0);
    }

    #[test]
    fn test_withdraw_after_abort_returns_full_deposit() {
        let mut pool = funded_pool();
        pool.fail(&addr("admin")).unwrap();
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("a"), &mut transfer), Ok(2));
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(5));
        assert_eq!(pool.withdraw_all(&addr("c"), &mut transfer), Ok(1));
        assert_eq!(pool.custody(), 0);
    }

    #[test]
    fn test_withdraw_after_refund() {
        let mut pool = funded_pool();
        forward(&mut pool);
        pool.refund_presale(&addr("admin"), 63).unwrap();
        assert_eq!(pool.claimable(&addr("a")), 42);
        assert_eq!(pool.claimable(&addr("b")), 25);
        assert_eq!(pool.claimable(&addr("c")), 1);
    }

    #[test]
    fn test_remaining_withdrawn_before_refund_not_paid_twice() {
        let mut pool = funded_pool();
        forward(&mut pool);
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(4));

        pool.refund_presale(&addr("admin"), 63).unwrap();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(21));
        assert_eq!(transfer.received(&addr("b")), 25);
    }

    #[test]
    fn test_withdraw_in_token_distribution() {
        let mut pool = funded_pool();
        forward(&mut pool);
        pool.set_token(&addr("admin"), TokenRef::try_new("0xtoken").unwrap()).unwrap();
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(4));
    }

    #[test]
    fn test_withdraw_twice_second_is_zero() {
        let mut pool = funded_pool();
        pool.fail(&addr("admin")).unwrap();
        let mut transfer = RecordingTransfer::new();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(5));
        let custody = pool.custody();
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(0));
        assert_eq!(pool.custody(), custody);
        assert_eq!(transfer.payouts().len(), 1);
    }

    #[test]
    fn test_unknown_participant_withdraws_zero() {
        let mut pool = funded_pool();
        pool.fail(&addr("admin")).unwrap();
        let mut calls = 0;
        let mut transfer = |_: &mut PresalePool, _: &Address, _: Amount| -> Result<(), TransferError> {
            calls += 1;
            Ok(())
        };
        assert_eq!(pool.withdraw_all(&addr("stranger"), &mut transfer), Ok(0));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_failed_transfer_keeps_balance_claimable() {
        let mut pool = funded_pool();
        pool.fail(&addr("admin")).unwrap();
        let mut transfer = RecordingTransfer::new();
        transfer.reject(addr("b"));

        let result = pool.withdraw_all(&addr("b"), &mut transfer);
        assert!(matches!(
            result,
            Err(PoolError::TransferFailure { amount: 5, .. })
        ));
        assert_eq!(pool.claimable(&addr("b")), 5);
        assert_eq!(pool.custody(), 8);
        assert_eq!(pool.participant(&addr("b")).unwrap().withdrawn, 0);

        transfer.accept(&addr("b"));
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(5));
    }

    #[test]
    fn test_reentrant_withdraw_sees_zero() {
        let mut pool = funded_pool();
        pool.fail(&addr("admin")).unwrap();
        let mut inner = Vec::new();
        let mut transfer = |pool: &mut PresalePool, to: &Address, _: Amount| -> Result<(), TransferError> {
            let mut nested = RecordingTransfer::new();
            inner.push(pool.withdraw_all(to, &mut nested));
            Ok(())
        };
        assert_eq!(pool.withdraw_all(&addr("b"), &mut transfer), Ok(5));
        assert_eq!(inner, vec![Ok(0)]);
        assert_eq!(pool.custody(), 3);
    }
}
