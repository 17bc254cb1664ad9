//! # Shared Types Crate
//!
//! Domain primitives shared across the withdrawal-queue workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, id spaces, and amount aliases
//!   are defined here and nowhere else.
//! - **Fixed-Point Discipline**: all share/value conversions go through
//!   [`ShareRate`] so precision and rounding are decided in one place.

pub mod entities;
pub mod rate;

pub use entities::*;
pub use rate::{ShareRate, SHARE_RATE_PRECISION};
