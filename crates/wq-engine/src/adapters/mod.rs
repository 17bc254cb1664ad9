//! In-memory adapters for the outbound ports
//!
//! Used by the test suites and for local wiring; production hosts supply
//! their own gateway implementations.

pub mod clock;
pub mod share_accounting;
pub mod wrapped_token;

pub use clock::{ManualClock, SystemClock};
pub use share_accounting::InMemoryShareAccounting;
pub use wrapped_token::InMemoryWrappedToken;
