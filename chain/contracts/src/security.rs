//! Access control and re-entrancy protection for pool operations
//!
//! Role assignment is supplied from outside the pool: the admin at
//! construction and the presale recipient at forwarding time. Operations
//! call the `require_*` guards first thing, before touching any state.

use serde::{Deserialize, Serialize};
use tracing::warn;
use types::ids::Address;

use crate::errors::PoolError;

/// Roles recognised by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Configures caps, forwards funds, aborts, records the token
    Admin,
    /// Receives forwarded funds; may return them as a refund
    PresaleRecipient,
}

/// Role holder registry for a single pool.
#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: Address,
    presale_recipient: Option<Address>,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            presale_recipient: None,
        }
    }

    /// Check if a caller holds the specified role.
    pub fn has_role(&self, caller: &Address, role: Role) -> bool {
        match role {
            Role::Admin => *caller == self.admin,
            Role::PresaleRecipient => self.presale_recipient.as_ref() == Some(caller),
        }
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        self.has_role(caller, Role::Admin)
    }

    pub fn is_presale_recipient(&self, caller: &Address) -> bool {
        self.has_role(caller, Role::PresaleRecipient)
    }

    /// Reject unless the caller is admin.
    pub fn require_admin(&self, caller: &Address) -> Result<(), PoolError> {
        if !self.is_admin(caller) {
            warn!(caller = %caller, "admin role required");
            return Err(PoolError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Reject unless the caller is admin or the presale recipient.
    pub fn require_admin_or_recipient(&self, caller: &Address) -> Result<(), PoolError> {
        if !self.is_admin(caller) && !self.is_presale_recipient(caller) {
            warn!(caller = %caller, "admin or presale recipient role required");
            return Err(PoolError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Transfer admin to a new address. Returns `false` if `current_admin`
    /// is not the admin.
    pub fn transfer_admin(&mut self, current_admin: &Address, new_admin: Address) -> bool {
        if !self.is_admin(current_admin) {
            return false;
        }
        self.admin = new_admin;
        true
    }

    /// Get the current admin.
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn presale_recipient(&self) -> Option<&Address> {
        self.presale_recipient.as_ref()
    }

    /// Returns the previous holder so a failed forward can restore it.
    pub(crate) fn set_presale_recipient(&mut self, recipient: Option<Address>) -> Option<Address> {
        std::mem::replace(&mut self.presale_recipient, recipient)
    }
}

/// Lock held while forwarded funds are in flight.
///
/// Forwarding commits its effects before paying the recipient and rolls
/// them back if the payment fails, so nothing else may mutate the pool in
/// between. Every other operation only `check`s it; withdrawals never
/// acquire it, a re-entrant withdrawal already observes a zero claim.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub fn release(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Reject with `Reentrancy` while locked.
    pub fn check(&self, operation: &'static str) -> Result<(), PoolError> {
        if self.locked {
            warn!(operation, "re-entrant call while forwarding is in flight");
            return Err(PoolError::Reentrancy { operation });
        }
        Ok(())
    }
}
