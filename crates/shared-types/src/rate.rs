//! Fixed-point share rate
//!
//! A [`ShareRate`] is value-per-share scaled by 1e27. All conversions use
//! U256 intermediates so no u128 amount can overflow mid-multiplication,
//! and all divisions floor.

use crate::entities::{ShareAmount, ValueAmount, U256};
use serde::{Deserialize, Serialize};

/// Scaling factor for [`ShareRate`]: rates carry 27 decimal places.
pub const SHARE_RATE_PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Value per share, fixed-point with 27 decimal places.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ShareRate(pub u128);

impl ShareRate {
    /// The 1:1 rate - one share is worth exactly one unit of value.
    pub const PAR: ShareRate = ShareRate(SHARE_RATE_PRECISION);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Rate implied by exchanging `value` for `shares`: floor(value * 1e27 / shares).
    ///
    /// Returns `None` when `shares` is zero or the scaled result exceeds u128.
    pub fn from_ratio(value: ValueAmount, shares: ShareAmount) -> Option<ShareRate> {
        if shares == 0 {
            return None;
        }
        let scaled = U256::from(value) * U256::from(SHARE_RATE_PRECISION) / U256::from(shares);
        to_u128(scaled).map(ShareRate)
    }

    /// Value of `shares` at this rate: floor(shares * rate / 1e27).
    ///
    /// Saturates at `u128::MAX`; callers cap the result against a par value
    /// anyway, so saturation never reaches a payout.
    pub fn value_for_shares(&self, shares: ShareAmount) -> ValueAmount {
        let value = U256::from(shares) * U256::from(self.0) / U256::from(SHARE_RATE_PRECISION);
        to_u128(value).unwrap_or(u128::MAX)
    }

    /// Shares needed to represent `value` at this rate: floor(value * 1e27 / rate).
    ///
    /// Returns `None` for the zero rate or on u128 overflow.
    pub fn shares_for_value(&self, value: ValueAmount) -> Option<ShareAmount> {
        if self.0 == 0 {
            return None;
        }
        let shares = U256::from(value) * U256::from(SHARE_RATE_PRECISION) / U256::from(self.0);
        to_u128(shares)
    }
}

fn to_u128(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.as_u128())
    }
}
