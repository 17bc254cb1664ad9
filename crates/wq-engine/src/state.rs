use crate::domain::{
    CheckpointHistory, OwnershipRegistry, QueueLimits, RequestLedger, RoleRegistry,
};
use crate::error::{WithdrawalQueueError, WqResult};
use crate::events::outgoing::QueueEvent;
use crate::types::QueueConfig;
use shared_types::{AccountId, CheckpointIndex, RequestId, ShareRate, ValueAmount};

/// Outcome of committing a finalization batch against the state.
pub struct AppliedFinalization {
    pub first_request_id: RequestId,
    pub value_locked: ValueAmount,
    pub checkpoint_index: CheckpointIndex,
    pub checkpoint_created: bool,
}

pub struct QueueState {
    /// Append-only request arena with prefix sums
    pub ledger: RequestLedger,
    /// Run-length discount history
    pub checkpoints: CheckpointHistory,
    /// Owner index, approvals, operators
    pub ownership: OwnershipRegistry,
    /// Capability grants for gated mutations
    pub roles: RoleRegistry,
    /// Current amount limits (wide form)
    pub limits: QueueLimits,
    /// Highest finalized id; never decreases
    pub last_finalized_request_id: RequestId,
    /// Value held against finalized-but-unclaimed requests
    pub locked_value_amount: ValueAmount,
    /// Paused queues reject request creation, finalization, and claims
    pub paused: bool,
    /// Events buffered for the host to drain
    pub pending_events: Vec<QueueEvent>,
}

impl QueueState {
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            ledger: RequestLedger::new(),
            checkpoints: CheckpointHistory::new(),
            ownership: OwnershipRegistry::new(),
            roles: RoleRegistry::new(),
            limits: config.limits,
            last_finalized_request_id: 0,
            locked_value_amount: 0,
            paused: config.start_paused,
            pending_events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: QueueEvent) {
        self.pending_events.push(event);
    }

    /// Take and clear the buffered events
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn ensure_not_paused(&self) -> WqResult<()> {
        if self.paused {
            return Err(WithdrawalQueueError::QueuePaused);
        }
        Ok(())
    }

    pub fn unfinalized_request_count(&self) -> u64 {
        self.ledger.last_request_id() - self.last_finalized_request_id
    }

    pub fn unfinalized_value(&self) -> ValueAmount {
        let first = self.last_finalized_request_id + 1;
        let last = self.ledger.last_request_id();
        if first > last {
            return 0;
        }
        // Range was just derived from the watermarks, it cannot be invalid
        self.ledger
            .range_totals(first, last)
            .map(|(value, _)| value)
            .unwrap_or(0)
    }

    /// Validate a (request, hint) pair exactly as `claim` would and return
    /// the payout it would release. Read-only.
    pub fn validate_claim(
        &self,
        request_id: RequestId,
        hint: CheckpointIndex,
    ) -> WqResult<ValueAmount> {
        if request_id == 0 || request_id > self.last_finalized_request_id {
            return Err(WithdrawalQueueError::RequestNotFoundOrNotFinalized { request_id });
        }
        let request = self
            .ledger
            .get(request_id)
            .ok_or(WithdrawalQueueError::RequestNotFoundOrNotFinalized { request_id })?;
        if request.claimed {
            return Err(WithdrawalQueueError::RequestAlreadyClaimed { request_id });
        }
        if !self.checkpoints.is_valid_hint(hint, request_id) {
            return Err(WithdrawalQueueError::InvalidHint { request_id, hint });
        }
        let rate = self
            .checkpoints
            .get(hint)
            .map(|c| c.max_share_rate)
            .ok_or(WithdrawalQueueError::InvalidHint { request_id, hint })?;
        Ok(request.payout_at(rate))
    }

    /// Mark a validated claim as settled. Must run before any value leaves
    /// the queue so a reentrant claim observes `claimed` already set.
    ///
    /// Returns the owner recorded at claim time.
    pub fn apply_claim(&mut self, request_id: RequestId, payout: ValueAmount) -> AccountId {
        debug_assert!(self.locked_value_amount >= payout);
        self.locked_value_amount = self.locked_value_amount.saturating_sub(payout);
        let owner = match self.ledger.get_mut(request_id) {
            Some(request) => {
                request.claimed = true;
                request.owner
            }
            // validate_claim precedes every apply_claim
            None => return shared_types::ZERO_ADDRESS,
        };
        self.ownership.record_claimed(owner, request_id);
        owner
    }

    /// Commit a finalization batch: mark the range finalized, lock the
    /// pre-computed payout sum, advance the watermark, record the
    /// checkpoint.
    ///
    /// The caller has already validated the target id, derived the rate,
    /// and computed `value_locked` via the batch preview, so nothing here
    /// can fail - the commit is all-or-nothing by construction.
    pub fn apply_finalization(
        &mut self,
        target_id: RequestId,
        rate: ShareRate,
        value_locked: ValueAmount,
    ) -> AppliedFinalization {
        let first_request_id = self.last_finalized_request_id + 1;

        for request in self.ledger.slice_mut(first_request_id, target_id) {
            request.finalized = true;
        }

        let (checkpoint_index, checkpoint_created) =
            self.checkpoints.record(first_request_id, rate);
        self.last_finalized_request_id = target_id;
        // Payouts never exceed par values, whose running total the ledger
        // already bounds within u128
        debug_assert!(self.locked_value_amount.checked_add(value_locked).is_some());
        self.locked_value_amount = self.locked_value_amount.saturating_add(value_locked);

        AppliedFinalization {
            first_request_id,
            value_locked,
            checkpoint_index,
            checkpoint_created,
        }
    }
}
