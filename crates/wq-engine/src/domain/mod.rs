//! Domain module for the withdrawal-queue subsystem
//!
//! ## Core Modules
//! - request: queued redemption requests with prefix sums
//! - ledger: append-only request arena
//! - checkpoint: run-length discount history with binary-search lookup
//! - finalization: batch rate derivation and payout math
//! - range_finder: feasible-finalization binary searches
//!
//! ## Supporting Modules
//! - ownership: owner index, approvals, transfers
//! - access: capability grants for gated mutations
//! - limits: packed/wide amount-limit records

pub mod access;
pub mod checkpoint;
pub mod finalization;
pub mod ledger;
pub mod limits;
pub mod ownership;
pub mod range_finder;
pub mod request;

pub use access::{Capability, RoleRegistry};
pub use checkpoint::{Checkpoint, CheckpointHistory};
pub use finalization::{derive_batch_rate, preview_batch, BatchPreview};
pub use ledger::RequestLedger;
pub use limits::{PackedQueueLimits, QueueLimits};
pub use ownership::OwnershipRegistry;
pub use range_finder::{
    last_finalizable, last_finalizable_by_budget, last_finalizable_by_timestamp, NOT_FOUND,
};
pub use request::WithdrawalRequest;
