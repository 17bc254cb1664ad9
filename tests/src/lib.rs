//! # Withdrawal-Queue Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Full request → finalize → claim choreography
//!     ├── flows.rs      # Lifecycle flows and custody conservation
//!     └── scenarios.rs  # Rate-movement and discount scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p wq-tests
//!
//! # By category
//! cargo test -p wq-tests integration::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
