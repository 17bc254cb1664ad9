//! Finalization batch math
//!
//! A batch is the contiguous unfinalized range `[first, target]`. The value
//! attached by the finalizer implies a discount rate for the whole batch;
//! each request then pays the lesser of its par value and its shares priced
//! at that rate. The same formula is reused verbatim at claim time, which is
//! what makes locked value and claimed payouts balance exactly.

use crate::domain::ledger::RequestLedger;
use crate::error::{WithdrawalQueueError, WqResult};
use shared_types::{RequestId, ShareAmount, ShareRate, ValueAmount};

/// Outcome of batch math: what a finalization would lock and burn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPreview {
    /// Sum of per-request payouts at the batch rate
    pub value_to_lock: ValueAmount,
    /// Sum of share amounts across the batch
    pub shares_to_burn: ShareAmount,
}

/// Rate implied by attaching `value_attached` against `batch_shares`.
pub fn derive_batch_rate(
    value_attached: ValueAmount,
    batch_shares: ShareAmount,
) -> WqResult<ShareRate> {
    if batch_shares == 0 {
        return Err(WithdrawalQueueError::ZeroShareRate);
    }
    ShareRate::from_ratio(value_attached, batch_shares).ok_or(WithdrawalQueueError::ValueOverflow)
}

/// Compute the batch outcome for `[first, last]` at `rate` without mutating
/// anything. This is the exact math `finalize` commits.
pub fn preview_batch(
    ledger: &RequestLedger,
    first: RequestId,
    last: RequestId,
    rate: ShareRate,
) -> WqResult<BatchPreview> {
    if rate.is_zero() {
        return Err(WithdrawalQueueError::ZeroShareRate);
    }
    // Validates the range and gives the share total in O(1)
    let (_, shares_to_burn) = ledger.range_totals(first, last)?;

    let mut value_to_lock: ValueAmount = 0;
    for request in ledger.slice(first, last) {
        value_to_lock = value_to_lock
            .checked_add(request.payout_at(rate))
            .ok_or(WithdrawalQueueError::ValueOverflow)?;
    }

    Ok(BatchPreview {
        value_to_lock,
        shares_to_burn,
    })
}
