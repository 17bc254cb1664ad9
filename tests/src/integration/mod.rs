//! Integration tests exercising the full withdrawal-queue lifecycle.

pub mod flows;
pub mod scenarios;
