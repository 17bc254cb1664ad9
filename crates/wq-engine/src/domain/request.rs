//! Withdrawal request entity

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, ShareAmount, ShareRate, Timestamp, ValueAmount};

/// A single queued redemption request.
///
/// Immutable after creation except for the `finalized` and `claimed` flags.
/// The cumulative fields are prefix sums over the whole ledger up to and
/// including this request, so any contiguous range total is two lookups.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Current owner; rewritten on transfer
    pub owner: AccountId,
    /// Value amount fixed at creation, before any discount
    pub par_value: ValueAmount,
    /// Shares redeemed, priced by the exchange rate at creation
    pub shares: ShareAmount,
    /// Creation timestamp; non-decreasing across the ledger
    pub timestamp: Timestamp,
    /// Set once the finalizer locks value against this request
    pub finalized: bool,
    /// Set exactly once, when the payout is released
    pub claimed: bool,
    /// Sum of par values of requests 1..=this
    pub cumulative_value: ValueAmount,
    /// Sum of shares of requests 1..=this
    pub cumulative_shares: ShareAmount,
}

impl WithdrawalRequest {
    /// Payout owed at `rate`: the lesser of par value and the share value.
    ///
    /// Par is the hard ceiling - a rate above the creation-time rate never
    /// pays more than the request was created for.
    pub fn payout_at(&self, rate: ShareRate) -> ValueAmount {
        self.par_value.min(rate.value_for_shares(self.shares))
    }
}
