//! Packed and wide amount limits
//!
//! The wide record is what the engine works with in memory; the packed
//! record is the compact persisted form with narrow fields. The conversion
//! is an explicit encode/decode boundary: encode validates ranges and fails
//! fast on overflow of the narrow width, decode is an infallible widening.

use crate::error::{WithdrawalQueueError, WqResult};
use serde::{Deserialize, Serialize};
use shared_types::ValueAmount;

/// Wide, in-memory limits record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLimits {
    /// Smallest value amount a request may carry
    pub min_request_amount: ValueAmount,
    /// Largest value amount a request may carry
    pub max_request_amount: ValueAmount,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            min_request_amount: 100,
            max_request_amount: 1_000_000_000_000,
        }
    }
}

/// Compact persisted limits record with u64 fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedQueueLimits {
    min_request_amount: u64,
    max_request_amount: u64,
}

impl PackedQueueLimits {
    /// Narrow a wide record, validating field ranges and ordering.
    pub fn encode(limits: &QueueLimits) -> WqResult<Self> {
        if limits.min_request_amount > limits.max_request_amount {
            return Err(WithdrawalQueueError::InvalidLimits {
                min: limits.min_request_amount,
                max: limits.max_request_amount,
            });
        }
        let min_request_amount = u64::try_from(limits.min_request_amount).map_err(|_| {
            WithdrawalQueueError::LimitValueOutOfBounds {
                field: "min_request_amount",
                value: limits.min_request_amount,
            }
        })?;
        let max_request_amount = u64::try_from(limits.max_request_amount).map_err(|_| {
            WithdrawalQueueError::LimitValueOutOfBounds {
                field: "max_request_amount",
                value: limits.max_request_amount,
            }
        })?;
        Ok(Self {
            min_request_amount,
            max_request_amount,
        })
    }

    /// Widen back to the in-memory record.
    pub fn decode(&self) -> QueueLimits {
        QueueLimits {
            min_request_amount: self.min_request_amount as ValueAmount,
            max_request_amount: self.max_request_amount as ValueAmount,
        }
    }
}
