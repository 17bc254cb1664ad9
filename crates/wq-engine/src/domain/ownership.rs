//! Owner index and transfer authorization
//!
//! A derived secondary structure: the ledger's `owner` field is the source
//! of truth, this registry only indexes outstanding (unclaimed) ids per
//! owner and tracks delegation. Updated on creation, transfer, and claim.

use shared_types::{AccountId, RequestId};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Per-owner holdings plus per-request and per-owner delegation.
#[derive(Debug, Default)]
pub struct OwnershipRegistry {
    /// Outstanding request ids per owner, ascending
    holdings: HashMap<AccountId, BTreeSet<RequestId>>,
    /// Single approved delegate per request, cleared on transfer and claim
    approvals: HashMap<RequestId, AccountId>,
    /// Blanket operator approvals per owner
    operators: HashMap<AccountId, HashSet<AccountId>>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, owner: AccountId, request_id: RequestId) {
        self.holdings.entry(owner).or_default().insert(request_id);
    }

    /// Drop a claimed request from the index and void its approval.
    pub fn record_claimed(&mut self, owner: AccountId, request_id: RequestId) {
        if let Some(set) = self.holdings.get_mut(&owner) {
            set.remove(&request_id);
            if set.is_empty() {
                self.holdings.remove(&owner);
            }
        }
        self.approvals.remove(&request_id);
    }

    /// Outstanding request ids of `owner`, ascending.
    pub fn requests_of(&self, owner: &AccountId) -> Vec<RequestId> {
        self.holdings
            .get(owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Set or clear the approved delegate for one request.
    pub fn set_approval(&mut self, request_id: RequestId, delegate: Option<AccountId>) {
        match delegate {
            Some(delegate) => {
                self.approvals.insert(request_id, delegate);
            }
            None => {
                self.approvals.remove(&request_id);
            }
        }
    }

    /// Grant or revoke blanket operator rights over all of `owner`'s requests.
    pub fn set_operator(&mut self, owner: AccountId, operator: AccountId, approved: bool) {
        if approved {
            self.operators.entry(owner).or_default().insert(operator);
        } else if let Some(set) = self.operators.get_mut(&owner) {
            set.remove(&operator);
            if set.is_empty() {
                self.operators.remove(&owner);
            }
        }
    }

    /// Whether `caller` may act on `request_id` currently owned by `owner`.
    pub fn is_authorized(
        &self,
        caller: &AccountId,
        owner: &AccountId,
        request_id: RequestId,
    ) -> bool {
        if caller == owner {
            return true;
        }
        if self.approvals.get(&request_id) == Some(caller) {
            return true;
        }
        self.operators
            .get(owner)
            .map(|set| set.contains(caller))
            .unwrap_or(false)
    }

    /// Move `request_id` between owner sets and void its approval.
    pub fn record_transferred(&mut self, from: AccountId, to: AccountId, request_id: RequestId) {
        if let Some(set) = self.holdings.get_mut(&from) {
            set.remove(&request_id);
            if set.is_empty() {
                self.holdings.remove(&from);
            }
        }
        self.holdings.entry(to).or_default().insert(request_id);
        self.approvals.remove(&request_id);
    }
}
