//! Append-only request ledger
//!
//! A growable arena indexed by `id - 1`. Ids are dense, start at 1, and are
//! never reused. Each record carries running totals of value and shares so
//! any range total is O(1) via prefix-sum differences.

use crate::domain::limits::QueueLimits;
use crate::domain::request::WithdrawalRequest;
use crate::error::{WithdrawalQueueError, WqResult};
use shared_types::{AccountId, RequestId, ShareAmount, Timestamp, ValueAmount};

/// Append-only store of withdrawal requests with cumulative sums.
#[derive(Debug, Default)]
pub struct RequestLedger {
    requests: Vec<WithdrawalRequest>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest id ever issued; 0 while the ledger is empty.
    pub fn last_request_id(&self) -> RequestId {
        self.requests.len() as RequestId
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Append a request, enforcing the configured amount bounds.
    ///
    /// Timestamps are clamped to be non-decreasing across ids, which keeps
    /// the timestamp range finder's predicate monotone even if the host
    /// clock steps backward.
    pub fn append(
        &mut self,
        owner: AccountId,
        par_value: ValueAmount,
        shares: ShareAmount,
        timestamp: Timestamp,
        limits: &QueueLimits,
    ) -> WqResult<RequestId> {
        if par_value < limits.min_request_amount {
            return Err(WithdrawalQueueError::RequestAmountTooSmall {
                amount: par_value,
                min: limits.min_request_amount,
            });
        }
        if par_value > limits.max_request_amount {
            return Err(WithdrawalQueueError::RequestAmountTooLarge {
                amount: par_value,
                max: limits.max_request_amount,
            });
        }

        let (prev_value, prev_shares, prev_ts) = match self.requests.last() {
            Some(prev) => (prev.cumulative_value, prev.cumulative_shares, prev.timestamp),
            None => (0, 0, 0),
        };

        let cumulative_value = prev_value
            .checked_add(par_value)
            .ok_or(WithdrawalQueueError::ValueOverflow)?;
        let cumulative_shares = prev_shares
            .checked_add(shares)
            .ok_or(WithdrawalQueueError::ValueOverflow)?;

        self.requests.push(WithdrawalRequest {
            owner,
            par_value,
            shares,
            timestamp: timestamp.max(prev_ts),
            finalized: false,
            claimed: false,
            cumulative_value,
            cumulative_shares,
        });

        Ok(self.last_request_id())
    }

    /// Look up a request by id; `None` for 0 or ids never issued.
    pub fn get(&self, id: RequestId) -> Option<&WithdrawalRequest> {
        if id == 0 {
            return None;
        }
        self.requests.get(id as usize - 1)
    }

    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut WithdrawalRequest> {
        if id == 0 {
            return None;
        }
        self.requests.get_mut(id as usize - 1)
    }

    /// Contiguous slice of requests `first..=last`.
    ///
    /// Callers must have validated the range; an out-of-bounds range panics
    /// like any slice index would.
    pub fn slice(&self, first: RequestId, last: RequestId) -> &[WithdrawalRequest] {
        &self.requests[first as usize - 1..last as usize]
    }

    /// Mutable variant of [`Self::slice`].
    pub fn slice_mut(&mut self, first: RequestId, last: RequestId) -> &mut [WithdrawalRequest] {
        &mut self.requests[first as usize - 1..last as usize]
    }

    /// Total (par value, shares) of requests `first..=last` via prefix sums.
    pub fn range_totals(
        &self,
        first: RequestId,
        last: RequestId,
    ) -> WqResult<(ValueAmount, ShareAmount)> {
        if first == 0 || first > last || last > self.last_request_id() {
            return Err(WithdrawalQueueError::InvalidRequestIdRange { first, last });
        }
        let (base_value, base_shares) = if first == 1 {
            (0, 0)
        } else {
            let prev = &self.requests[first as usize - 2];
            (prev.cumulative_value, prev.cumulative_shares)
        };
        let end = &self.requests[last as usize - 1];
        Ok((
            end.cumulative_value - base_value,
            end.cumulative_shares - base_shares,
        ))
    }
}
