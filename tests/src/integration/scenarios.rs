//! # Rate-Movement Scenarios
//!
//! Scenario coverage for the payout model: rebases between request and
//! finalization, slashing discounts, mixed-rate batches, and rounding at
//! the fixed-point boundary.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{AccountId, ShareRate, SHARE_RATE_PRECISION};
    use wq_engine::adapters::{InMemoryShareAccounting, InMemoryWrappedToken, ManualClock};
    use wq_engine::domain::{Capability, QueueLimits};
    use wq_engine::ports::inbound::WithdrawalQueueApi;
    use wq_engine::{QueueConfig, WithdrawalQueueService};

    const ALICE: AccountId = [0xA1; 20];
    const BOB: AccountId = [0xB2; 20];
    const ORACLE: AccountId = [0x0E; 20];

    struct Queue {
        service: WithdrawalQueueService<InMemoryShareAccounting, InMemoryWrappedToken, ManualClock>,
        share_accounting: Arc<InMemoryShareAccounting>,
    }

    fn build_queue() -> Queue {
        let share_accounting = Arc::new(InMemoryShareAccounting::new(ShareRate::PAR));
        let wrapped_token = Arc::new(InMemoryWrappedToken::new(ShareRate::PAR));
        let clock = Arc::new(ManualClock::new(50_000));
        let service = WithdrawalQueueService::new(
            QueueConfig {
                limits: QueueLimits {
                    min_request_amount: 1,
                    max_request_amount: u128::MAX >> 1,
                },
                start_paused: false,
            },
            Arc::clone(&share_accounting),
            wrapped_token,
            clock,
        );
        service.grant_capability(Capability::Finalize, ORACLE);
        Queue {
            service,
            share_accounting,
        }
    }

    fn rate(numerator: u128, denominator: u128) -> ShareRate {
        ShareRate(SHARE_RATE_PRECISION * numerator / denominator)
    }

    /// Rewards accrue after the request is queued. The holder's shares are
    /// now worth more than par, but the payout stays capped at the par
    /// value recorded at request time.
    #[tokio::test]
    async fn test_rebase_up_after_request_pays_par_not_share_value() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![1_000], None)
            .await
            .unwrap();

        // Shares now worth 2x; the oracle attaches full share value
        q.share_accounting.set_share_rate(rate(2, 1));
        let summary = q.service.finalize(ORACLE, 1, 2_000).await.unwrap();

        // 2_000 against 1_000 shares implies a 2x batch rate, but par caps
        // the payout at 1_000
        assert_eq!(summary.value_locked, 1_000);
        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 1_000);
    }

    /// A slashing halves the share rate before finalization. The oracle
    /// attaches what the shares are now worth and the holder takes the
    /// discount.
    #[tokio::test]
    async fn test_slashing_before_finalization_discounts_payout() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![1_000], None)
            .await
            .unwrap();

        q.share_accounting.set_share_rate(rate(1, 2));
        let summary = q.service.finalize(ORACLE, 1, 500).await.unwrap();

        assert_eq!(summary.value_locked, 500);
        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 500);
        assert_eq!(q.share_accounting.total_transferred(), 500);
    }

    /// Requests created at different rates land in one batch. The single
    /// batch rate discounts by shares, and the per-request par cap applies
    /// to each request independently.
    #[tokio::test]
    async fn test_mixed_rate_batch_caps_each_request_independently() {
        let q = build_queue();

        // Alice queues 1_000 par at 1:1 → 1_000 shares
        q.service
            .request_withdrawals(ALICE, vec![1_000], None)
            .await
            .unwrap();

        // Rate doubles; Bob queues 1_000 par at 2:1 → 500 shares
        q.share_accounting.set_share_rate(rate(2, 1));
        q.service
            .request_withdrawals(BOB, vec![1_000], None)
            .await
            .unwrap();

        // Batch of 1_500 shares with 3_000 attached implies a 2x rate.
        // Alice's 1_000 shares are worth 2_000 but par caps at 1_000;
        // Bob's 500 shares are worth exactly his 1_000 par.
        let summary = q.service.finalize(ORACLE, 2, 3_000).await.unwrap();
        assert_eq!(summary.value_locked, 2_000);

        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 1_000);
        assert_eq!(q.service.claim_withdrawal(BOB, 2, 1, None).await.unwrap(), 1_000);
        assert_eq!(q.service.locked_value_amount().await, 0);
    }

    /// Four batches at three distinct rates produce three checkpoints; a
    /// bounded hint search over a window that excludes the covering
    /// checkpoint returns 0 for the affected ids.
    #[tokio::test]
    async fn test_checkpoint_windows_and_bounded_hint_search() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![100, 100, 100, 100], None)
            .await
            .unwrap();

        q.service.finalize(ORACLE, 1, 100).await.unwrap(); // par → cp 1
        q.service.finalize(ORACLE, 2, 50).await.unwrap(); // half → cp 2
        q.service.finalize(ORACLE, 3, 50).await.unwrap(); // half → merges into cp 2
        q.service.finalize(ORACLE, 4, 25).await.unwrap(); // quarter → cp 3
        assert_eq!(q.service.last_checkpoint_index().await, 3);

        let hints = q
            .service
            .find_checkpoint_hints_unbounded(vec![1, 2, 3, 4])
            .await
            .unwrap();
        assert_eq!(hints, vec![1, 2, 2, 3]);

        // Window [2, 3] cannot cover request 1
        let bounded = q
            .service
            .find_checkpoint_hints(vec![1, 2, 4], 2, 3)
            .await
            .unwrap();
        assert_eq!(bounded, vec![0, 2, 3]);
    }

    /// Discounted rates floor at the E27 boundary; summed payouts never
    /// exceed the attached budget.
    #[tokio::test]
    async fn test_rounding_never_overpays_budget() {
        let q = build_queue();
        // Amounts chosen so the implied rate divides nothing evenly
        q.service
            .request_withdrawals(ALICE, vec![7, 11, 13], None)
            .await
            .unwrap();

        // 31 shares, 23 attached → rate floor(23e27/31)
        let summary = q.service.finalize(ORACLE, 3, 23).await.unwrap();
        assert!(summary.value_locked <= 23);

        let hints = q
            .service
            .find_checkpoint_hints_unbounded(vec![1, 2, 3])
            .await
            .unwrap();
        let mut paid = 0u128;
        for (&id, &hint) in [1u64, 2, 3].iter().zip(hints.iter()) {
            paid += q.service.claim_withdrawal(ALICE, id, hint, None).await.unwrap();
        }
        assert_eq!(paid, summary.value_locked);
        assert!(paid <= 23);
        assert_eq!(q.service.locked_value_amount().await, 0);
    }

    /// A single-share dust request at a deep discount rounds its payout
    /// down to zero but still claims cleanly.
    #[tokio::test]
    async fn test_dust_request_claims_zero_cleanly() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![1, 1_000], None)
            .await
            .unwrap();

        // Attach less than one value unit per thousand shares
        let summary = q.service.finalize(ORACLE, 2, 500).await.unwrap();

        let dust = q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap();
        assert_eq!(dust, 0);
        let rest = q.service.claim_withdrawal(ALICE, 2, 1, None).await.unwrap();
        assert_eq!(dust + rest, summary.value_locked);
        assert_eq!(q.service.locked_value_amount().await, 0);
    }

    /// The derived batch rate is exactly value/shares when no request hits
    /// its par cap, so the whole attached budget gets locked.
    #[tokio::test]
    async fn test_uniform_discount_locks_exactly_the_budget() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![400, 600], None)
            .await
            .unwrap();

        // 1_000 shares, 750 attached → 3/4 rate, payouts 300 + 450
        let summary = q.service.finalize(ORACLE, 2, 750).await.unwrap();
        assert_eq!(summary.value_locked, 750);
        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 300);
        assert_eq!(q.service.claim_withdrawal(ALICE, 2, 1, None).await.unwrap(), 450);
    }
}
