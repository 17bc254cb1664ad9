//! Share-Accounting Adapter
//!
//! In-memory implementation of `ShareAccountingGateway` for tests and local
//! wiring. Records every value movement so callers can assert conservation.

use crate::error::{WithdrawalQueueError, WqResult};
use crate::ports::outbound::ShareAccountingGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{AccountId, ShareAmount, ShareRate, ValueAmount};

/// In-memory share-accounting collaborator with a settable exchange rate.
pub struct InMemoryShareAccounting {
    rate: RwLock<ShareRate>,
    pulled: RwLock<Vec<(AccountId, ValueAmount)>>,
    transfers: RwLock<Vec<(AccountId, ValueAmount)>>,
    burned_shares: RwLock<ShareAmount>,
    fail_transfers: RwLock<bool>,
    fail_burns: RwLock<bool>,
}

impl InMemoryShareAccounting {
    /// Create an adapter quoting `rate` until changed.
    pub fn new(rate: ShareRate) -> Self {
        Self {
            rate: RwLock::new(rate),
            pulled: RwLock::new(Vec::new()),
            transfers: RwLock::new(Vec::new()),
            burned_shares: RwLock::new(0),
            fail_transfers: RwLock::new(false),
            fail_burns: RwLock::new(false),
        }
    }

    /// Move the quoted exchange rate (rebase).
    pub fn set_share_rate(&self, rate: ShareRate) {
        *self.rate.write() = rate;
    }

    /// Make every subsequent transfer fail, for error-path tests.
    pub fn set_fail_transfers(&self, fail: bool) {
        *self.fail_transfers.write() = fail;
    }

    /// Make every subsequent burn fail, for error-path tests.
    pub fn set_fail_burns(&self, fail: bool) {
        *self.fail_burns.write() = fail;
    }

    /// Every (account, amount) pulled into queue custody.
    pub fn pulled(&self) -> Vec<(AccountId, ValueAmount)> {
        self.pulled.read().clone()
    }

    /// Every (recipient, amount) released from queue custody.
    pub fn transfers(&self) -> Vec<(AccountId, ValueAmount)> {
        self.transfers.read().clone()
    }

    pub fn total_pulled(&self) -> ValueAmount {
        self.pulled.read().iter().map(|(_, v)| v).sum()
    }

    pub fn total_transferred(&self) -> ValueAmount {
        self.transfers.read().iter().map(|(_, v)| v).sum()
    }

    pub fn burned_shares(&self) -> ShareAmount {
        *self.burned_shares.read()
    }
}

#[async_trait]
impl ShareAccountingGateway for InMemoryShareAccounting {
    async fn current_share_rate(&self) -> WqResult<ShareRate> {
        Ok(*self.rate.read())
    }

    async fn pull_value(&self, from: AccountId, amount: ValueAmount) -> WqResult<()> {
        self.pulled.write().push((from, amount));
        Ok(())
    }

    async fn burn_shares(&self, amount: ShareAmount) -> WqResult<()> {
        if *self.fail_burns.read() {
            return Err(WithdrawalQueueError::GatewayError {
                reason: "burn rejected by test configuration".to_string(),
            });
        }
        *self.burned_shares.write() += amount;
        Ok(())
    }

    async fn transfer_value(&self, to: AccountId, amount: ValueAmount) -> WqResult<()> {
        if *self.fail_transfers.read() {
            return Err(WithdrawalQueueError::GatewayError {
                reason: "transfer rejected by test configuration".to_string(),
            });
        }
        self.transfers.write().push((to, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_pulls_and_transfers() {
        let adapter = InMemoryShareAccounting::new(ShareRate::PAR);
        adapter.pull_value([1u8; 20], 300).await.unwrap();
        adapter.transfer_value([2u8; 20], 150).await.unwrap();
        adapter.burn_shares(300).await.unwrap();

        assert_eq!(adapter.total_pulled(), 300);
        assert_eq!(adapter.total_transferred(), 150);
        assert_eq!(adapter.burned_shares(), 300);
    }

    #[tokio::test]
    async fn test_rate_is_settable() {
        let adapter = InMemoryShareAccounting::new(ShareRate::PAR);
        adapter.set_share_rate(ShareRate(1));
        assert_eq!(adapter.current_share_rate().await.unwrap(), ShareRate(1));
    }

    #[tokio::test]
    async fn test_transfer_failure_injection() {
        let adapter = InMemoryShareAccounting::new(ShareRate::PAR);
        adapter.set_fail_transfers(true);
        assert!(adapter.transfer_value([2u8; 20], 1).await.is_err());
    }
}
