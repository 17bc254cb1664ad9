//! # wq-engine
//!
//! Withdrawal queue engine: FIFO request ledger, batched finalization with
//! rate discounts, and hint-driven claims.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Request Ledger**: Append-only queue with cumulative running sums
//! - **Finalization**: Contiguous batches locked at a derived share rate
//! - **Checkpoint History**: Run-length encoded rates for O(log n) claims
//! - **Custody Discipline**: Value leaves only after a claim is recorded
//!
//! ## Architecture
//!
//! ```text
//! Staker ──request──→ Withdrawal Queue ──pull value──→ Share Accounting
//!                          │
//! Oracle ──finalize──→ checkpoint history ──burn shares──→ Share Accounting
//!                          │
//! Owner ──claim(hint)──→ payout lookup ──transfer value──→ recipient
//! ```
//!
//! ## Payout Model
//!
//! Each request records its par value and the shares it redeems at creation
//! time. Finalization derives a batch rate from the value the finalizer
//! attaches, and every request in the batch is paid
//! `min(par_value, shares x rate)` - holders never profit from a rebase that
//! happened after they queued, and a discount is shared pro rata by shares.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wq_engine::{WithdrawalQueueService, QueueConfig};
//! use wq_engine::ports::inbound::WithdrawalQueueApi;
//!
//! let service = WithdrawalQueueService::new(
//!     QueueConfig::default(),
//!     share_accounting,
//!     wrapped_token,
//!     clock,
//! );
//!
//! // Queue a withdrawal
//! let ids = service.request_withdrawals(staker, vec![amount], None).await?;
//!
//! // Finalize and claim
//! service.finalize(oracle, target_id, budget).await?;
//! let hints = service.find_checkpoint_hints_unbounded(ids.clone()).await?;
//! service.claim_withdrawal(staker, ids[0], hints[0], None).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;
pub mod types;

pub use domain::{
    BatchPreview, Capability, Checkpoint, CheckpointHistory, PackedQueueLimits, QueueLimits,
    RequestLedger, WithdrawalRequest,
};
pub use error::{WithdrawalQueueError, WqResult};
pub use service::WithdrawalQueueService;
pub use types::QueueConfig;
