//! Capability-based access control
//!
//! A flat set of (capability, principal) grants checked before every gated
//! mutation. No role hierarchy; holding one capability implies nothing
//! about any other.

use crate::error::{WithdrawalQueueError, WqResult};
use serde::{Deserialize, Serialize};
use shared_types::AccountId;
use std::collections::HashSet;

/// Gated operations on the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Commit finalization batches
    Finalize,
    /// Replace the packed amount limits
    ManageLimits,
    /// Pause the queue
    Pause,
    /// Resume a paused queue
    Resume,
}

/// Grant set for the queue's gated operations.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    grants: HashSet<(Capability, AccountId)>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, capability: Capability, principal: AccountId) {
        self.grants.insert((capability, principal));
    }

    pub fn revoke(&mut self, capability: Capability, principal: AccountId) {
        self.grants.remove(&(capability, principal));
    }

    pub fn has(&self, capability: Capability, principal: &AccountId) -> bool {
        self.grants.contains(&(capability, *principal))
    }

    /// Fail with `MissingCapability` unless the grant exists.
    pub fn require(&self, capability: Capability, principal: &AccountId) -> WqResult<()> {
        if self.has(capability, principal) {
            Ok(())
        } else {
            Err(WithdrawalQueueError::MissingCapability {
                capability,
                principal: *principal,
            })
        }
    }
}
