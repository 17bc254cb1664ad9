//! Wrapped-Token Adapter
//!
//! In-memory implementation of `WrappedTokenGateway`. Conversion uses a
//! fixed wrapped-to-value rate; one-time authorizations are tracked by
//! nonce so replays fail the way the real collaborator would reject a
//! spent permit.

use crate::error::{WithdrawalQueueError, WqResult};
use crate::ports::outbound::{SignedAuthorization, WrappedTokenGateway};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{AccountId, ShareRate, ValueAmount};
use std::collections::HashSet;

/// In-memory wrapped-token collaborator.
pub struct InMemoryWrappedToken {
    /// Value per wrapped token, E27 fixed-point
    rate: RwLock<ShareRate>,
    used_nonces: RwLock<HashSet<[u8; 32]>>,
    pulled: RwLock<Vec<(AccountId, ValueAmount)>>,
}

impl InMemoryWrappedToken {
    pub fn new(rate: ShareRate) -> Self {
        Self {
            rate: RwLock::new(rate),
            used_nonces: RwLock::new(HashSet::new()),
            pulled: RwLock::new(Vec::new()),
        }
    }

    pub fn set_rate(&self, rate: ShareRate) {
        *self.rate.write() = rate;
    }

    /// Every (account, wrapped amount) pulled through this adapter.
    pub fn pulled(&self) -> Vec<(AccountId, ValueAmount)> {
        self.pulled.read().clone()
    }
}

#[async_trait]
impl WrappedTokenGateway for InMemoryWrappedToken {
    async fn unwrapped_value(&self, amount: ValueAmount) -> WqResult<ValueAmount> {
        Ok(self.rate.read().value_for_shares(amount))
    }

    async fn pull_wrapped(&self, from: AccountId, amount: ValueAmount) -> WqResult<ValueAmount> {
        self.pulled.write().push((from, amount));
        self.unwrapped_value(amount).await
    }

    async fn pull_wrapped_with_authorization(
        &self,
        authorization: &SignedAuthorization,
        amount: ValueAmount,
    ) -> WqResult<ValueAmount> {
        if amount > authorization.amount {
            return Err(WithdrawalQueueError::GatewayError {
                reason: format!(
                    "authorization covers {} wrapped tokens, {} requested",
                    authorization.amount, amount
                ),
            });
        }
        if !self.used_nonces.write().insert(authorization.nonce) {
            return Err(WithdrawalQueueError::GatewayError {
                reason: "authorization nonce already consumed".to_string(),
            });
        }
        self.pulled.write().push((authorization.signer, amount));
        self.unwrapped_value(amount).await
    }
}
