//! Hexagonal ports for the withdrawal-queue subsystem

pub mod inbound;
pub mod outbound;
