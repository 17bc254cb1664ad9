//! Outgoing events for the withdrawal-queue subsystem
//!
//! Events are buffered inside the queue state as operations commit and
//! drained by the host via `take_events`, so a failed operation never
//! leaves a stray event behind.

use serde::{Deserialize, Serialize};
use shared_types::{
    AccountId, CheckpointIndex, RequestId, ShareAmount, ShareRate, Timestamp, ValueAmount,
};
use uuid::Uuid;

/// Correlation ID for tracking a finalization batch across subsystems
pub type CorrelationId = Uuid;

/// A request entered the queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequestedEvent {
    pub request_id: RequestId,
    pub owner: AccountId,
    pub par_value: ValueAmount,
    pub shares: ShareAmount,
    pub timestamp: Timestamp,
}

/// A finalization batch committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFinalizedEvent {
    pub correlation_id: CorrelationId,
    pub first_request_id: RequestId,
    pub last_request_id: RequestId,
    pub value_locked: ValueAmount,
    pub shares_burned: ShareAmount,
    pub max_share_rate: ShareRate,
    pub checkpoint_index: CheckpointIndex,
}

/// A payout was released.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalClaimedEvent {
    pub request_id: RequestId,
    pub owner: AccountId,
    pub recipient: AccountId,
    pub payout: ValueAmount,
}

/// A request changed owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTransferredEvent {
    pub request_id: RequestId,
    pub from: AccountId,
    pub to: AccountId,
}

/// A committed payout could not be delivered; the claim stands and the
/// host must settle the amount out of band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTransferFailedEvent {
    pub recipient: AccountId,
    pub payout: ValueAmount,
    pub reason: String,
}

/// The amount limits were replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsUpdatedEvent {
    pub min_request_amount: ValueAmount,
    pub max_request_amount: ValueAmount,
}

/// All buffered queue events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueEvent {
    Requested(WithdrawalRequestedEvent),
    Finalized(BatchFinalizedEvent),
    Claimed(WithdrawalClaimedEvent),
    TransferFailed(PayoutTransferFailedEvent),
    Transferred(RequestTransferredEvent),
    LimitsUpdated(LimitsUpdatedEvent),
    Paused { by: AccountId },
    Resumed { by: AccountId },
}
