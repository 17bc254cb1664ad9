//! Error types for the withdrawal-queue subsystem
//!
//! Every variant is a pure function of current state and input: nothing is
//! retried internally, and a failed operation leaves no state change behind.

use crate::domain::access::Capability;
use shared_types::{AccountId, CheckpointIndex, RequestId, ShareAmount, Timestamp, ValueAmount};
use thiserror::Error;

/// Withdrawal-queue subsystem errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WithdrawalQueueError {
    /// Requested amount is below the configured minimum
    #[error("Request amount {amount} is below the configured minimum {min}")]
    RequestAmountTooSmall { amount: ValueAmount, min: ValueAmount },

    /// Requested amount is above the configured maximum
    #[error("Request amount {amount} is above the configured maximum {max}")]
    RequestAmountTooLarge { amount: ValueAmount, max: ValueAmount },

    /// Request id range is empty, overlaps finalized ids, or runs past the queue
    #[error("Invalid request id range [{first}, {last}]")]
    InvalidRequestIdRange { first: RequestId, last: RequestId },

    /// Hint lookup requires ids sorted in ascending order
    #[error("Request ids are not sorted in ascending order")]
    RequestIdsNotSorted,

    /// Request does not exist, or is not yet backed by locked value
    #[error("Request {request_id} not found or not finalized")]
    RequestNotFoundOrNotFinalized { request_id: RequestId },

    /// Request payout was already released
    #[error("Request {request_id} has already been claimed")]
    RequestAlreadyClaimed { request_id: RequestId },

    /// Supplied checkpoint hint does not cover the request
    #[error("Checkpoint hint {hint} does not cover request {request_id}")]
    InvalidHint {
        request_id: RequestId,
        hint: CheckpointIndex,
    },

    /// Zero or unknown request id
    #[error("Invalid request id: {request_id}")]
    InvalidRequestId { request_id: RequestId },

    /// Transfers to the zero address are rejected
    #[error("Transfer to the zero address")]
    TransferToZeroAddress,

    /// Caller is not authorized for this request
    #[error("Caller {caller:?} is neither the owner nor an approved delegate")]
    NotOwnerOrApproved { caller: AccountId },

    /// Principal lacks a required capability
    #[error("Principal {principal:?} lacks the {capability:?} capability")]
    MissingCapability {
        capability: Capability,
        principal: AccountId,
    },

    /// Zero value budget passed to a range finder or finalization
    #[error("Value budget must be non-zero")]
    ZeroBudget,

    /// Zero share rate passed where a rate is required
    #[error("Share rate must be non-zero")]
    ZeroShareRate,

    /// Zero timestamp passed to the timestamp range finder
    #[error("Timestamp must be non-zero")]
    ZeroTimestamp,

    /// Queue is paused; mutating operations are rejected
    #[error("Queue is paused")]
    QueuePaused,

    /// Pause requested while already paused
    #[error("Queue is already paused")]
    QueueAlreadyPaused,

    /// Resume requested while running
    #[error("Queue is not paused")]
    QueueNotPaused,

    /// Wide limits value does not fit the packed field width
    #[error("Limit field {field} value {value} exceeds the packed field width")]
    LimitValueOutOfBounds {
        field: &'static str,
        value: ValueAmount,
    },

    /// Limits record is internally inconsistent
    #[error("Invalid limits: minimum {min} exceeds maximum {max}")]
    InvalidLimits { min: ValueAmount, max: ValueAmount },

    /// One-time authorization presented after its expiry
    #[error("Authorization expired at {expiry}, current time {now}")]
    AuthorizationExpired { expiry: Timestamp, now: Timestamp },

    /// Arithmetic overflow while summing value amounts
    #[error("Value amount overflow")]
    ValueOverflow,

    /// Collaborator gateway failure
    #[error("Collaborator gateway error: {reason}")]
    GatewayError { reason: String },

    /// Claim committed but the outbound value transfer failed; the payout
    /// is recorded as released and must be settled out of band
    #[error("Payout of {payout} committed but the value transfer failed: {reason}")]
    PayoutTransferFailed { payout: ValueAmount, reason: String },

    /// Finalization committed but the share burn failed; the batch stands
    /// and the burn must be retried out of band
    #[error("Batch committed but burning {shares} shares failed: {reason}")]
    ShareBurnFailed { shares: ShareAmount, reason: String },
}

/// Result type for withdrawal-queue operations
pub type WqResult<T> = Result<T, WithdrawalQueueError>;
