//! Domain events emitted by the withdrawal queue

pub mod outgoing;

pub use outgoing::*;
