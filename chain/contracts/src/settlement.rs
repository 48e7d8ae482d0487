//! Settlement Engine — forwarding committed funds and distributing refunds
//!
//! Forwarding is the only point where funds leave custody before the pool
//! resolves. It commits every effect (state, forwarded amount, recipient,
//! custody) before paying the recipient, and rolls all of them back if the
//! payment is refused.
//!
//! A refund arrives as an attached payment of at least the forwarded amount
//! and is credited pro rata by frozen contribution:
//!
//! ```text
//! refund_i = floor(payment * contribution_i / total_contribution)
//! ```
//!
//! The truncation residue `payment - sum(refund_i)` stays in custody and is
//! recorded as `refund_dust`; no operation releases it.

use tracing::{info, warn};
use types::amount::Amount;
use types::ids::Address;
use types::state::PoolState;

use crate::errors::PoolError;
use crate::events::{ForwardedToPresale, PoolEvent, RefundDistributed};
use crate::pool::PresalePool;
use crate::transfer::ValueTransfer;

impl PresalePool {
    /// Send the committed total to `recipient` (Open → Paid). Admin-only.
    ///
    /// `min_pool_total` guards against the committed total shrinking between
    /// the admin's decision and execution; the total must also be nonzero.
    pub fn forward_to_presale(
        &mut self,
        caller: &Address,
        recipient: Address,
        min_pool_total: Amount,
        transfer: &mut impl ValueTransfer,
    ) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("forward_to_presale")?;
        self.lifecycle.ensure("forward_to_presale", PoolState::Open)?;
        self.access_control.require_admin(caller)?;

        let amount = self.ledger.total_contribution();
        let required = min_pool_total.max(1);
        if amount < required {
            return Err(PoolError::InsufficientPayment {
                required,
                provided: amount,
            });
        }
        let custody = self.custody.checked_sub(amount).ok_or(PoolError::Overflow)?;

        // Effects
        let previous_state = self.lifecycle.transition("forward_to_presale", PoolState::Paid)?;
        let previous_recipient = self
            .access_control
            .set_presale_recipient(Some(recipient.clone()));
        self.custody = custody;
        self.amount_forwarded = amount;
        let acquired = self.forwarding_guard.acquire();
        debug_assert!(acquired, "forwarding guard checked on entry");

        // Interaction
        let sent = transfer.send(self, &recipient, amount);
        self.forwarding_guard.release();

        if let Err(e) = sent {
            self.custody += amount;
            self.amount_forwarded = 0;
            self.access_control.set_presale_recipient(previous_recipient);
            self.lifecycle.revert_to(previous_state);
            warn!(recipient = %recipient, amount, reason = %e, "forwarding to presale failed");
            return Err(PoolError::TransferFailure {
                to: recipient,
                amount,
                reason: e.reason,
            });
        }

        let event = PoolEvent::ForwardedToPresale(ForwardedToPresale { recipient, amount });
        info!(amount, total_remaining = self.ledger.total_remaining(), "committed funds forwarded to presale");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Accept a refund of the forwarded funds (Paid → Failed).
    ///
    /// Callable by the admin or the presale recipient; `payment` is the
    /// native value attached to the call and must cover `amount_forwarded`.
    pub fn refund_presale(
        &mut self,
        caller: &Address,
        payment: Amount,
    ) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("refund_presale")?;
        self.lifecycle.ensure("refund_presale", PoolState::Paid)?;
        self.access_control.require_admin_or_recipient(caller)?;

        if payment < self.amount_forwarded {
            warn!(caller = %caller, payment, required = self.amount_forwarded, "refund below forwarded amount");
            return Err(PoolError::InsufficientPayment {
                required: self.amount_forwarded,
                provided: payment,
            });
        }
        let custody = self.custody.checked_add(payment).ok_or(PoolError::Overflow)?;

        let distributed = self.ledger.credit_refunds(payment)?;
        self.lifecycle.transition("refund_presale", PoolState::Failed)?;
        let dust = payment - distributed;
        self.custody = custody;
        self.refund_received = payment;
        self.refund_dust = dust;

        let event = PoolEvent::RefundDistributed(RefundDistributed {
            caller: caller.clone(),
            payment,
            distributed,
            dust,
        });
        info!(caller = %caller, payment, distributed, dust, "refund distributed");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Whether a refund payment has been credited to participants.
    pub fn refund_distributed(&self) -> bool {
        self.state() == PoolState::Failed && self.amount_forwarded > 0
    }
}
