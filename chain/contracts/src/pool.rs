//! Presale Pool — the single owned contract instance
//!
//! Owns the ledger, lifecycle, roles and custody balance, and exposes every
//! pool operation. Settlement (`forward_to_presale`, `refund_presale`) lives
//! in `settlement.rs`; payouts (`withdraw_all`) in `withdrawal.rs`.
//!
//! Every operation checks, in order:
//! 1. Forwarding not in flight
//! 2. Lifecycle state
//! 3. Caller role
//! 4. Amounts
//!
//! and only then mutates. A rejected call leaves the pool exactly as it was.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use types::account::ParticipantBalance;
use types::amount::Amount;
use types::ids::{Address, PoolId, TokenRef};
use types::state::PoolState;

use crate::config::{ContributionSettings, PoolConfig};
use crate::errors::PoolError;
use crate::events::{
    AdminTransferred, ContributionSettingsChanged, Deposited, PoolEvent, PoolFailed, TokenSet,
};
use crate::ledger::ContributionLedger;
use crate::lifecycle::Lifecycle;
use crate::security::{AccessControl, ReentrancyGuard};

#[derive(Debug, Clone)]
pub struct PresalePool {
    pub(crate) pool_id: PoolId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) access_control: AccessControl,
    pub(crate) ledger: ContributionLedger,
    /// Native funds currently held by the pool
    pub(crate) custody: Amount,
    pub(crate) amount_forwarded: Amount,
    /// Refund payment accepted on Paid → Failed
    pub(crate) refund_received: Amount,
    pub(crate) refund_dust: Amount,
    pub(crate) token: Option<TokenRef>,
    pub(crate) forwarding_guard: ReentrancyGuard,
    /// Emitted events log (append-only)
    pub(crate) events: Vec<PoolEvent>,
}

impl PresalePool {
    /// Create an Open pool with unbounded caps.
    pub fn new(admin: Address) -> Self {
        Self::with_settings(admin, ContributionSettings::default())
    }

    /// Create a pool from a validated config.
    pub fn from_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let settings = config.settings();
        Ok(Self::with_settings(config.admin, settings))
    }

    fn with_settings(admin: Address, settings: ContributionSettings) -> Self {
        let pool = Self {
            pool_id: PoolId::new(),
            created_at: Utc::now(),
            lifecycle: Lifecycle::new(),
            access_control: AccessControl::new(admin),
            ledger: ContributionLedger::new(settings),
            custody: 0,
            amount_forwarded: 0,
            refund_received: 0,
            refund_dust: 0,
            token: None,
            forwarding_guard: ReentrancyGuard::new(),
            events: Vec::new(),
        };
        info!(pool_id = %pool.pool_id, admin = %pool.admin(), "presale pool created");
        pool
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Accept `amount` of native funds from `participant`.
    ///
    /// The funds start uncommitted and the depositor is then re-allocated
    /// against the current caps.
    pub fn deposit(&mut self, participant: &Address, amount: Amount) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("deposit")?;
        self.lifecycle.ensure_allocation_open("deposit")?;

        let custody = self.custody.checked_add(amount).ok_or(PoolError::Overflow)?;
        let record = self.ledger.deposit(participant, amount)?;
        let event = PoolEvent::Deposited(Deposited {
            participant: participant.clone(),
            amount,
            contribution: record.contribution,
            remaining: record.remaining,
        });
        self.custody = custody;

        info!(participant = %participant, amount, "deposit accepted");
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Contribution Settings ─────────────────────────

    /// Replace the caps and re-allocate every participant. Admin-only.
    pub fn set_contribution_settings(
        &mut self,
        caller: &Address,
        min_contribution: Amount,
        max_contribution: Amount,
        pool_cap: Amount,
    ) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("set_contribution_settings")?;
        self.lifecycle.ensure_allocation_open("set_contribution_settings")?;
        self.access_control.require_admin(caller)?;

        let settings = ContributionSettings::new(min_contribution, max_contribution, pool_cap);
        self.ledger.set_settings(settings)?;

        let event = PoolEvent::ContributionSettingsChanged(ContributionSettingsChanged {
            min_contribution,
            max_contribution,
            pool_cap,
            total_contribution: self.ledger.total_contribution(),
            total_remaining: self.ledger.total_remaining(),
        });
        info!(
            min_contribution,
            max_contribution,
            pool_cap,
            total_contribution = self.ledger.total_contribution(),
            "contribution settings changed"
        );
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Transitions ─────────────────────────

    /// Abort the pool before anything was forwarded (Open → Failed). Admin-only.
    ///
    /// Every deposit becomes withdrawable in full.
    pub fn fail(&mut self, caller: &Address) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("fail")?;
        self.lifecycle.ensure("fail", PoolState::Open)?;
        self.access_control.require_admin(caller)?;

        self.lifecycle.transition("fail", PoolState::Failed)?;
        let event = PoolEvent::PoolFailed(PoolFailed {
            caller: caller.clone(),
        });
        warn!(caller = %caller, custody = self.custody, "pool aborted before forwarding");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Record the derivative token (Paid → TokenDistribution). Admin-only.
    pub fn set_token(&mut self, caller: &Address, token: TokenRef) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("set_token")?;
        self.lifecycle.ensure("set_token", PoolState::Paid)?;
        self.access_control.require_admin(caller)?;

        self.lifecycle.transition("set_token", PoolState::TokenDistribution)?;
        self.token = Some(token.clone());
        info!(token = %token, "derivative token recorded");
        let event = PoolEvent::TokenSet(TokenSet { token });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Access Control ─────────────────────────

    /// Hand the admin role to `new_admin`. Legal in every state.
    pub fn transfer_admin(
        &mut self,
        caller: &Address,
        new_admin: Address,
    ) -> Result<PoolEvent, PoolError> {
        self.forwarding_guard.check("transfer_admin")?;
        if !self.access_control.transfer_admin(caller, new_admin.clone()) {
            warn!(caller = %caller, "unauthorized admin transfer attempt");
            return Err(PoolError::Unauthorized {
                caller: caller.clone(),
            });
        }
        let event = PoolEvent::AdminTransferred(AdminTransferred {
            previous: caller.clone(),
            current: new_admin,
        });
        info!(previous = %caller, current = %self.admin(), "admin transferred");
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn admin(&self) -> &Address {
        self.access_control.admin()
    }

    pub fn presale_recipient(&self) -> Option<&Address> {
        self.access_control.presale_recipient()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> PoolState {
        self.lifecycle.state()
    }

    pub fn settings(&self) -> &ContributionSettings {
        self.ledger.settings()
    }

    pub fn total_contribution(&self) -> Amount {
        self.ledger.total_contribution()
    }

    pub fn total_remaining(&self) -> Amount {
        self.ledger.total_remaining()
    }

    pub fn amount_forwarded(&self) -> Amount {
        self.amount_forwarded
    }

    pub fn refund_received(&self) -> Amount {
        self.refund_received
    }

    /// Refund residue that no participant can claim.
    pub fn refund_dust(&self) -> Amount {
        self.refund_dust
    }

    /// Native funds currently held by the pool.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn token(&self) -> Option<&TokenRef> {
        self.token.as_ref()
    }

    pub fn participant(&self, address: &Address) -> Option<&ParticipantBalance> {
        self.ledger.participant(address)
    }

    /// Participants in first-deposit order.
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantBalance> {
        self.ledger.participants()
    }

    pub fn ledger(&self) -> &ContributionLedger {
        &self.ledger
    }

    /// Conservation holds for every participant and both aggregates.
    pub fn check_invariants(&self) -> bool {
        self.ledger.check_invariants()
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }
}
