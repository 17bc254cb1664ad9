//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The queue's collaborators live behind these traits: the share-accounting
//! token that owns the value/share exchange rate and mint/burn authority,
//! the wrapped-token adapter used by the wrapped request variants, and the
//! host clock.

use crate::error::WqResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{AccountId, ShareAmount, ShareRate, Timestamp, ValueAmount};

/// One-time signed permission to move a wrapped-token balance.
///
/// Bound to signer, spender, amount, and expiry; the gateway consumes the
/// nonce so a grant can never be replayed. The signature itself is opaque
/// to the engine - verification is the wrapped-token collaborator's job.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedAuthorization {
    pub signer: AccountId,
    pub spender: AccountId,
    /// Wrapped-token amount the grant covers
    pub amount: ValueAmount,
    /// Unix time after which the grant is void
    pub expiry: Timestamp,
    pub nonce: [u8; 32],
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 65],
}

/// Share-accounting collaborator.
///
/// Sole authority for the value/share exchange rate and for minting and
/// burning shares. The queue never computes a rate of its own at request
/// creation; it prices every request against this gateway's snapshot.
#[async_trait]
pub trait ShareAccountingGateway: Send + Sync {
    /// Current value-per-share exchange rate.
    async fn current_share_rate(&self) -> WqResult<ShareRate>;

    /// Pull `amount` of value from `from` into the queue's custody.
    async fn pull_value(&self, from: AccountId, amount: ValueAmount) -> WqResult<()>;

    /// Burn the shares redeemed by a finalized batch.
    async fn burn_shares(&self, amount: ShareAmount) -> WqResult<()>;

    /// Release `amount` of value from the queue's custody to `to`.
    async fn transfer_value(&self, to: AccountId, amount: ValueAmount) -> WqResult<()>;
}

/// Wrapped-token collaborator for the wrapped request variants.
#[async_trait]
pub trait WrappedTokenGateway: Send + Sync {
    /// Value of `amount` wrapped tokens at the wrapper's own exchange rate,
    /// without moving anything.
    async fn unwrapped_value(&self, amount: ValueAmount) -> WqResult<ValueAmount>;

    /// Pull `amount` wrapped tokens from `from` via pre-existing allowance
    /// and unwrap them; returns the unwrapped value now in queue custody.
    async fn pull_wrapped(&self, from: AccountId, amount: ValueAmount) -> WqResult<ValueAmount>;

    /// As [`Self::pull_wrapped`], but consuming a one-time signed
    /// authorization instead of an allowance.
    async fn pull_wrapped_with_authorization(
        &self,
        authorization: &SignedAuthorization,
        amount: ValueAmount,
    ) -> WqResult<ValueAmount>;
}

/// Host time source for request creation timestamps and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
