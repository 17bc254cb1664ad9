//! Finalizable-range binary searches
//!
//! Read-only planning aids for the finalizer: given an external budget, a
//! rate assumption, or a time horizon, find the furthest id the queue could
//! be finalized to. Both predicates are monotone over the unfinalized id
//! range - timestamps never decrease with id, and batch cost only grows as
//! the batch extends - so binary search applies.

use crate::domain::finalization::preview_batch;
use crate::domain::ledger::RequestLedger;
use crate::error::{WithdrawalQueueError, WqResult};
use shared_types::{RequestId, ShareRate, Timestamp, ValueAmount};

/// Id returned when no id in the searched range satisfies the predicate.
pub const NOT_FOUND: RequestId = 0;

fn validate_unfinalized_range(
    first: RequestId,
    last: RequestId,
    last_finalized_request_id: RequestId,
    last_request_id: RequestId,
) -> WqResult<()> {
    if first == 0 || first > last || first <= last_finalized_request_id || last > last_request_id
    {
        return Err(WithdrawalQueueError::InvalidRequestIdRange { first, last });
    }
    Ok(())
}

/// Largest id in `[first, last]` whose creation timestamp is at most
/// `max_timestamp`, or [`NOT_FOUND`] if even `first` is too recent.
pub fn last_finalizable_by_timestamp(
    ledger: &RequestLedger,
    max_timestamp: Timestamp,
    first: RequestId,
    last: RequestId,
    last_finalized_request_id: RequestId,
) -> WqResult<RequestId> {
    if max_timestamp == 0 {
        return Err(WithdrawalQueueError::ZeroTimestamp);
    }
    validate_unfinalized_range(first, last, last_finalized_request_id, ledger.last_request_id())?;

    let timestamp_of = |id: RequestId| ledger.get(id).map(|r| r.timestamp).unwrap_or(u64::MAX);
    if timestamp_of(first) > max_timestamp {
        return Ok(NOT_FOUND);
    }
    let (mut lo, mut hi) = (first, last);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if timestamp_of(mid) <= max_timestamp {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Largest id in `[first, last]` whose batch locking cost at `max_share_rate`
/// stays within `max_value`, or [`NOT_FOUND`] if even `first` busts the
/// budget. Cost is the same per-request math `finalize` commits.
pub fn last_finalizable_by_budget(
    ledger: &RequestLedger,
    max_value: ValueAmount,
    max_share_rate: ShareRate,
    first: RequestId,
    last: RequestId,
    last_finalized_request_id: RequestId,
) -> WqResult<RequestId> {
    if max_value == 0 {
        return Err(WithdrawalQueueError::ZeroBudget);
    }
    if max_share_rate.is_zero() {
        return Err(WithdrawalQueueError::ZeroShareRate);
    }
    validate_unfinalized_range(first, last, last_finalized_request_id, ledger.last_request_id())?;

    let cost_to = |id: RequestId| -> WqResult<ValueAmount> {
        Ok(preview_batch(ledger, first, id, max_share_rate)?.value_to_lock)
    };
    if cost_to(first)? > max_value {
        return Ok(NOT_FOUND);
    }
    let (mut lo, mut hi) = (first, last);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if cost_to(mid)? <= max_value {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Compose both predicates over the whole unfinalized range: the furthest id
/// finalizable within `max_value` at `max_share_rate` among requests created
/// no later than `max_timestamp`.
///
/// Returns [`NOT_FOUND`] when nothing is unfinalized or either predicate
/// rejects the very first unfinalized request.
pub fn last_finalizable(
    ledger: &RequestLedger,
    max_value: ValueAmount,
    max_share_rate: ShareRate,
    max_timestamp: Timestamp,
    last_finalized_request_id: RequestId,
) -> WqResult<RequestId> {
    if max_value == 0 {
        return Err(WithdrawalQueueError::ZeroBudget);
    }
    if max_share_rate.is_zero() {
        return Err(WithdrawalQueueError::ZeroShareRate);
    }
    if max_timestamp == 0 {
        return Err(WithdrawalQueueError::ZeroTimestamp);
    }

    let first = last_finalized_request_id + 1;
    let last = ledger.last_request_id();
    if first > last {
        return Ok(NOT_FOUND);
    }

    let by_time = last_finalizable_by_timestamp(
        ledger,
        max_timestamp,
        first,
        last,
        last_finalized_request_id,
    )?;
    if by_time == NOT_FOUND {
        return Ok(NOT_FOUND);
    }
    let by_budget = last_finalizable_by_budget(
        ledger,
        max_value,
        max_share_rate,
        first,
        last,
        last_finalized_request_id,
    )?;
    if by_budget == NOT_FOUND {
        return Ok(NOT_FOUND);
    }
    Ok(by_time.min(by_budget))
}
