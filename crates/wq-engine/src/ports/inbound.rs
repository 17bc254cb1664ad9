//! Driving Ports (API - Inbound)
//!
//! The primary API of the withdrawal-queue subsystem: request creation,
//! finalization, planning queries, claims, and transfers.

use crate::domain::{BatchPreview, PackedQueueLimits};
use crate::error::WqResult;
use crate::events::outgoing::QueueEvent;
use crate::ports::outbound::SignedAuthorization;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{
    AccountId, CheckpointIndex, RequestId, ShareAmount, ShareRate, Timestamp, ValueAmount,
};

/// Per-request status snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequestStatus {
    pub owner: AccountId,
    pub par_value: ValueAmount,
    pub shares: ShareAmount,
    pub timestamp: Timestamp,
    pub finalized: bool,
    pub claimed: bool,
}

/// Outcome of a committed finalization batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalizationSummary {
    /// Value locked against the batch
    pub value_locked: ValueAmount,
    /// Shares burned for the batch
    pub shares_burned: ShareAmount,
    /// Checkpoint covering the batch
    pub checkpoint_index: CheckpointIndex,
    /// False when the batch merged into the previous checkpoint
    pub checkpoint_created: bool,
}

/// One entry of a batched claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub request_id: RequestId,
    pub hint: CheckpointIndex,
}

/// Primary withdrawal-queue API.
///
/// Every operation is atomic: it either commits all of its state changes or
/// none of them. Callers are identified explicitly - the hosting layer is
/// responsible for authenticating `caller` before it reaches the engine.
#[async_trait]
pub trait WithdrawalQueueApi: Send + Sync {
    /// Enqueue one request per amount for `owner` (defaults to the caller),
    /// pulling the total value from the caller via the share-accounting
    /// collaborator. All amounts are priced against one snapshot rate.
    async fn request_withdrawals(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
    ) -> WqResult<Vec<RequestId>>;

    /// As [`Self::request_withdrawals`], but amounts are wrapped-token
    /// amounts unwrapped through the wrapped-token collaborator first.
    async fn request_withdrawals_wrapped(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
    ) -> WqResult<Vec<RequestId>>;

    /// As [`Self::request_withdrawals_wrapped`], funded by a one-time
    /// signed authorization instead of a pre-existing allowance.
    async fn request_withdrawals_wrapped_with_authorization(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
        authorization: SignedAuthorization,
    ) -> WqResult<Vec<RequestId>>;

    /// Finalize every unfinalized request up to `target_id`, locking value
    /// derived from `value_attached`. Requires the `Finalize` capability.
    async fn finalize(
        &self,
        caller: AccountId,
        target_id: RequestId,
        value_attached: ValueAmount,
    ) -> WqResult<FinalizationSummary>;

    /// Pure preview of the batch math for `target_id` at a simulated rate.
    async fn preview_finalization_batch(
        &self,
        target_id: RequestId,
        max_share_rate: ShareRate,
    ) -> WqResult<BatchPreview>;

    /// Largest unfinalized id in `[first, last]` created at or before
    /// `max_timestamp`; 0 if none qualify.
    async fn find_last_finalizable_request_id_by_timestamp(
        &self,
        max_timestamp: Timestamp,
        first: RequestId,
        last: RequestId,
    ) -> WqResult<RequestId>;

    /// Largest unfinalized id in `[first, last]` whose batch cost at
    /// `max_share_rate` fits `max_value`; 0 if even the first exceeds it.
    async fn find_last_finalizable_request_id_by_budget(
        &self,
        max_value: ValueAmount,
        max_share_rate: ShareRate,
        first: RequestId,
        last: RequestId,
    ) -> WqResult<RequestId>;

    /// Compose the timestamp and budget searches over the whole unfinalized
    /// range; 0 when either yields 0.
    async fn find_last_finalizable_request_id(
        &self,
        max_value: ValueAmount,
        max_share_rate: ShareRate,
        max_timestamp: Timestamp,
    ) -> WqResult<RequestId>;

    /// Covering-checkpoint hints for sorted `ids` within the inclusive
    /// checkpoint-index bound `[first_index, last_index]`.
    async fn find_checkpoint_hints(
        &self,
        ids: Vec<RequestId>,
        first_index: CheckpointIndex,
        last_index: CheckpointIndex,
    ) -> WqResult<Vec<CheckpointIndex>>;

    /// As [`Self::find_checkpoint_hints`] over the full checkpoint history.
    async fn find_checkpoint_hints_unbounded(
        &self,
        ids: Vec<RequestId>,
    ) -> WqResult<Vec<CheckpointIndex>>;

    /// Status snapshots for `ids`; fails on ids never issued.
    async fn withdrawal_status(
        &self,
        ids: Vec<RequestId>,
    ) -> WqResult<Vec<WithdrawalRequestStatus>>;

    /// Read-only payout preview with the exact validation `claim` applies;
    /// invalid input fails identically, it is not a best-effort query.
    async fn claimable_value(&self, claims: Vec<ClaimRequest>) -> WqResult<Vec<ValueAmount>>;

    /// Claim one finalized request, paying out to `recipient` (the owner
    /// when `None`).
    async fn claim_withdrawal(
        &self,
        caller: AccountId,
        request_id: RequestId,
        hint: CheckpointIndex,
        recipient: Option<AccountId>,
    ) -> WqResult<ValueAmount>;

    /// Claim a batch atomically, paying every payout to `recipient`. If any
    /// entry fails validation the whole call aborts with no payouts.
    async fn claim_withdrawals_to(
        &self,
        caller: AccountId,
        claims: Vec<ClaimRequest>,
        recipient: AccountId,
    ) -> WqResult<Vec<ValueAmount>>;

    /// Move an unclaimed request from `from` to `to`. The caller must be
    /// the owner or an approved delegate.
    async fn transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        request_id: RequestId,
    ) -> WqResult<()>;

    /// Set or clear the approved delegate for one request (owner only).
    async fn approve(
        &self,
        caller: AccountId,
        request_id: RequestId,
        delegate: Option<AccountId>,
    ) -> WqResult<()>;

    /// Grant or revoke blanket operator rights over the caller's requests.
    async fn set_operator(
        &self,
        caller: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> WqResult<()>;

    /// Replace the amount limits; requires the `ManageLimits` capability.
    async fn set_limits(&self, caller: AccountId, limits: PackedQueueLimits) -> WqResult<()>;

    /// Pause all mutating operations; requires the `Pause` capability.
    async fn pause(&self, caller: AccountId) -> WqResult<()>;

    /// Resume a paused queue; requires the `Resume` capability.
    async fn resume(&self, caller: AccountId) -> WqResult<()>;

    /// Whether the queue is currently paused.
    async fn is_paused(&self) -> bool;

    /// Highest id ever issued.
    async fn last_request_id(&self) -> RequestId;

    /// Highest finalized id.
    async fn last_finalized_request_id(&self) -> RequestId;

    /// Value held against finalized-but-unclaimed requests.
    async fn locked_value_amount(&self) -> ValueAmount;

    /// Index of the most recent checkpoint.
    async fn last_checkpoint_index(&self) -> CheckpointIndex;

    /// Count of requests past the finalized watermark.
    async fn unfinalized_request_count(&self) -> u64;

    /// Total par value past the finalized watermark.
    async fn unfinalized_value(&self) -> ValueAmount;

    /// Outstanding request ids of `owner`, ascending.
    async fn requests_of(&self, owner: AccountId) -> Vec<RequestId>;

    /// Drain buffered domain events.
    async fn take_events(&self) -> Vec<QueueEvent>;
}
