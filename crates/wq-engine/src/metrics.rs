//! # Withdrawal-Queue Metrics
//!
//! Prometheus metrics for monitoring queue throughput and backlog.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! wq-engine = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `wq_requests_created_total` - Counter of requests entering the queue
//! - `wq_batches_finalized_total` - Counter of committed finalization batches
//! - `wq_checkpoints_created_total` - Counter of appended checkpoints (merges excluded)
//! - `wq_withdrawals_claimed_total` - Counter of released payouts
//! - `wq_locked_value` - Gauge of value held against finalized-unclaimed requests
//! - `wq_last_finalized_request_id` - Gauge of the finalized watermark
//! - `wq_queue_paused` - Gauge of the pause switch (0=running, 1=paused)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge, register_int_counter, Gauge, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total requests created
    pub static ref REQUESTS_CREATED: IntCounter = register_int_counter!(
        "wq_requests_created_total",
        "Total number of withdrawal requests created"
    )
    .expect("Failed to create REQUESTS_CREATED metric");

    /// Total finalization batches committed
    pub static ref BATCHES_FINALIZED: IntCounter = register_int_counter!(
        "wq_batches_finalized_total",
        "Total number of finalization batches committed"
    )
    .expect("Failed to create BATCHES_FINALIZED metric");

    /// Total checkpoints appended
    pub static ref CHECKPOINTS_CREATED: IntCounter = register_int_counter!(
        "wq_checkpoints_created_total",
        "Total number of checkpoints appended to the discount history"
    )
    .expect("Failed to create CHECKPOINTS_CREATED metric");

    /// Total claims settled
    pub static ref WITHDRAWALS_CLAIMED: IntCounter = register_int_counter!(
        "wq_withdrawals_claimed_total",
        "Total number of withdrawal payouts released"
    )
    .expect("Failed to create WITHDRAWALS_CLAIMED metric");

    /// Locked value backing finalized-unclaimed requests
    pub static ref LOCKED_VALUE: Gauge = register_gauge!(
        "wq_locked_value",
        "Value held against finalized but unclaimed requests"
    )
    .expect("Failed to create LOCKED_VALUE metric");

    /// Finalized watermark
    pub static ref LAST_FINALIZED_REQUEST_ID: Gauge = register_gauge!(
        "wq_last_finalized_request_id",
        "Highest finalized request id"
    )
    .expect("Failed to create LAST_FINALIZED_REQUEST_ID metric");

    /// Pause switch
    pub static ref QUEUE_PAUSED: Gauge = register_gauge!(
        "wq_queue_paused",
        "Whether the queue is paused (0=running, 1=paused)"
    )
    .expect("Failed to create QUEUE_PAUSED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record created requests
#[cfg(feature = "metrics")]
pub fn record_requests_created(count: u64) {
    REQUESTS_CREATED.inc_by(count);
}

/// Record a committed finalization batch
#[cfg(feature = "metrics")]
pub fn record_batch_finalized(checkpoint_created: bool) {
    BATCHES_FINALIZED.inc();
    if checkpoint_created {
        CHECKPOINTS_CREATED.inc();
    }
}

/// Record a settled claim
#[cfg(feature = "metrics")]
pub fn record_withdrawal_claimed() {
    WITHDRAWALS_CLAIMED.inc();
}

/// Update the locked-value gauge
#[cfg(feature = "metrics")]
pub fn set_locked_value(value: u128) {
    LOCKED_VALUE.set(value as f64);
}

/// Update the finalized-watermark gauge
#[cfg(feature = "metrics")]
pub fn set_last_finalized_request_id(id: u64) {
    LAST_FINALIZED_REQUEST_ID.set(id as f64);
}

/// Update the pause-switch gauge
#[cfg(feature = "metrics")]
pub fn set_queue_paused(paused: bool) {
    QUEUE_PAUSED.set(if paused { 1.0 } else { 0.0 });
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_requests_created(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_finalized(_checkpoint_created: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_withdrawal_claimed() {}

#[cfg(not(feature = "metrics"))]
pub fn set_locked_value(_value: u128) {}

#[cfg(not(feature = "metrics"))]
pub fn set_last_finalized_request_id(_id: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_queue_paused(_paused: bool) {}
