//! # Core Domain Entities
//!
//! Identities and id spaces used throughout the withdrawal queue.
//!
//! ## Clusters
//!
//! - **Identity**: `AccountId`
//! - **Queue**: `RequestId`, `CheckpointIndex`, `Timestamp`
//! - **Amounts**: `ValueAmount`, `ShareAmount`

// Re-export U256 from primitive-types for use across the workspace
pub use primitive_types::U256;

/// A 20-byte account address.
pub type AccountId = [u8; 20];

/// The all-zero address, never a valid owner or recipient.
pub const ZERO_ADDRESS: AccountId = [0u8; 20];

/// Sequential withdrawal request identifier.
///
/// Ids are dense and start at 1; 0 is the "not found" sentinel used by
/// hint lookups.
pub type RequestId = u64;

/// Sequential checkpoint index.
///
/// Indices are dense and start at 1; 0 is the "no covering checkpoint"
/// sentinel.
pub type CheckpointIndex = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// An amount of underlying value (the pool's unit of payment).
pub type ValueAmount = u128;

/// An amount of pool shares.
pub type ShareAmount = u128;
