//! # Integration Test Flows
//!
//! Full request → finalize → claim choreography through the public API,
//! with the in-memory gateways standing in for the share-accounting and
//! wrapped-token collaborators.
//!
//! ## Flows Tested:
//!
//! 1. **Staker → Queue**: Requests pull value and append to the ledger
//! 2. **Oracle → Queue**: Finalization locks value and burns shares
//! 3. **Owner → Queue**: Hinted claims release exactly the locked payouts
//! 4. **Custody conservation**: Locked value equals finalized-unclaimed payouts

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{AccountId, RequestId, ShareRate, SHARE_RATE_PRECISION};
    use wq_engine::adapters::{InMemoryShareAccounting, InMemoryWrappedToken, ManualClock};
    use wq_engine::domain::{Capability, QueueLimits};
    use wq_engine::ports::inbound::{ClaimRequest, WithdrawalQueueApi};
    use wq_engine::ports::outbound::Clock;
    use wq_engine::{QueueConfig, WithdrawalQueueService};

    const ALICE: AccountId = [0xA1; 20];
    const BOB: AccountId = [0xB2; 20];
    const CAROL: AccountId = [0xC3; 20];
    const ORACLE: AccountId = [0x0E; 20];

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Queue {
        service: WithdrawalQueueService<InMemoryShareAccounting, InMemoryWrappedToken, ManualClock>,
        share_accounting: Arc<InMemoryShareAccounting>,
        wrapped_token: Arc<InMemoryWrappedToken>,
        clock: Arc<ManualClock>,
    }

    /// Queue with par pricing, a granted oracle, and a deterministic clock.
    fn build_queue() -> Queue {
        let share_accounting = Arc::new(InMemoryShareAccounting::new(ShareRate::PAR));
        let wrapped_token = Arc::new(InMemoryWrappedToken::new(ShareRate::PAR));
        let clock = Arc::new(ManualClock::new(10_000));
        let service = WithdrawalQueueService::new(
            QueueConfig {
                limits: QueueLimits {
                    min_request_amount: 10,
                    max_request_amount: 10_000_000,
                },
                start_paused: false,
            },
            Arc::clone(&share_accounting),
            Arc::clone(&wrapped_token),
            Arc::clone(&clock),
        );
        service.grant_capability(Capability::Finalize, ORACLE);
        service.grant_capability(Capability::Pause, ORACLE);
        service.grant_capability(Capability::Resume, ORACLE);
        Queue {
            service,
            share_accounting,
            wrapped_token,
            clock,
        }
    }

    // =============================================================================
    // LIFECYCLE FLOWS
    // =============================================================================

    /// Three stakers queue, the oracle finalizes in two batches, everyone
    /// claims with discovered hints, and custody drains to zero.
    #[tokio::test]
    async fn test_full_lifecycle_with_multiple_stakers() {
        let q = build_queue();

        let alice_ids = q
            .service
            .request_withdrawals(ALICE, vec![1_000, 2_000], None)
            .await
            .unwrap();
        let bob_ids = q
            .service
            .request_withdrawals(BOB, vec![3_000], None)
            .await
            .unwrap();
        assert_eq!(alice_ids, vec![1, 2]);
        assert_eq!(bob_ids, vec![3]);
        assert_eq!(q.share_accounting.total_pulled(), 6_000);
        assert_eq!(q.service.unfinalized_request_count().await, 3);
        assert_eq!(q.service.unfinalized_value().await, 6_000);

        // Batch 1 at par, batch 2 discounted to half
        q.service.finalize(ORACLE, 2, 3_000).await.unwrap();
        q.service.finalize(ORACLE, 3, 1_500).await.unwrap();
        assert_eq!(q.service.last_finalized_request_id().await, 3);
        assert_eq!(q.service.unfinalized_request_count().await, 0);
        assert_eq!(q.service.locked_value_amount().await, 4_500);
        assert_eq!(q.share_accounting.burned_shares(), 6_000);

        let hints = q
            .service
            .find_checkpoint_hints_unbounded(vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(hints, vec![1, 1, 2]);

        assert_eq!(
            q.service.claim_withdrawal(ALICE, 1, hints[0], None).await.unwrap(),
            1_000
        );
        assert_eq!(
            q.service.claim_withdrawal(ALICE, 2, hints[1], None).await.unwrap(),
            2_000
        );
        assert_eq!(
            q.service.claim_withdrawal(BOB, 3, hints[2], None).await.unwrap(),
            1_500
        );

        assert_eq!(q.service.locked_value_amount().await, 0);
        assert_eq!(q.share_accounting.total_transferred(), 4_500);
    }

    /// Locked value always equals the payouts of finalized-unclaimed
    /// requests, across many small batches and interleaved claims.
    #[tokio::test]
    async fn test_custody_conservation_across_many_batches() {
        let q = build_queue();

        let mut ids: Vec<RequestId> = Vec::new();
        for i in 0..20u128 {
            let owner = if i % 2 == 0 { ALICE } else { BOB };
            let created = q
                .service
                .request_withdrawals(owner, vec![100 + i * 10], None)
                .await
                .unwrap();
            ids.extend(created);
        }

        // Finalize in batches of five, alternating par and 80% budgets
        for (batch, target) in [5u64, 10, 15, 20].iter().enumerate() {
            let first = q.service.last_finalized_request_id().await + 1;
            let preview = q
                .service
                .preview_finalization_batch(*target, ShareRate::PAR)
                .await
                .unwrap();
            let budget = if batch % 2 == 0 {
                preview.value_to_lock
            } else {
                preview.value_to_lock * 4 / 5
            };
            q.service.finalize(ORACLE, *target, budget).await.unwrap();
            assert!(first <= *target);
        }

        let hints = q
            .service
            .find_checkpoint_hints_unbounded(ids.clone())
            .await
            .unwrap();
        assert!(hints.iter().all(|&h| h > 0));

        let mut released = 0u128;
        for (&id, &hint) in ids.iter().zip(hints.iter()) {
            let locked_before = q.service.locked_value_amount().await;
            let status = q.service.withdrawal_status(vec![id]).await.unwrap();
            let owner = status[0].owner;
            let payout = q.service.claim_withdrawal(owner, id, hint, None).await.unwrap();
            released += payout;
            assert_eq!(
                q.service.locked_value_amount().await,
                locked_before - payout
            );
        }

        assert_eq!(q.service.locked_value_amount().await, 0);
        assert_eq!(q.share_accounting.total_transferred(), released);
    }

    /// Planning queries drive the oracle loop: timestamp bound first, then
    /// budget, then finalize exactly what the composed search returned.
    #[tokio::test]
    async fn test_oracle_planning_loop_with_moving_clock() {
        let q = build_queue();

        q.service
            .request_withdrawals(ALICE, vec![500], None)
            .await
            .unwrap();
        q.clock.advance(100);
        q.service
            .request_withdrawals(BOB, vec![500], None)
            .await
            .unwrap();
        q.clock.advance(100);
        q.service
            .request_withdrawals(CAROL, vec![500], None)
            .await
            .unwrap();

        // Only requests at least 150 seconds old are eligible
        let cutoff = q.clock.now() - 150;
        let target = q
            .service
            .find_last_finalizable_request_id(10_000, ShareRate::PAR, cutoff)
            .await
            .unwrap();
        assert_eq!(target, 1);

        // A tight budget clips the range further on the next pass
        q.clock.advance(1_000);
        let target = q
            .service
            .find_last_finalizable_request_id(1_000, ShareRate::PAR, q.clock.now())
            .await
            .unwrap();
        assert_eq!(target, 2);

        q.service.finalize(ORACLE, target, 1_000).await.unwrap();
        assert_eq!(q.service.last_finalized_request_id().await, 2);
        assert_eq!(
            q.service
                .find_last_finalizable_request_id(10_000, ShareRate::PAR, q.clock.now())
                .await
                .unwrap(),
            3
        );
    }

    /// A transferred request is claimed by its new owner; the old owner
    /// loses standing entirely.
    #[tokio::test]
    async fn test_transfer_then_claim_by_new_owner() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![700], None)
            .await
            .unwrap();
        q.service.finalize(ORACLE, 1, 700).await.unwrap();

        q.service.transfer_from(ALICE, ALICE, BOB, 1).await.unwrap();
        assert!(q
            .service
            .claim_withdrawal(ALICE, 1, 1, None)
            .await
            .is_err());

        let payout = q.service.claim_withdrawal(BOB, 1, 1, None).await.unwrap();
        assert_eq!(payout, 700);
        assert_eq!(q.share_accounting.transfers(), vec![(BOB, 700)]);
    }

    /// An operator approved for all of an owner's requests batches the
    /// claims to a single recipient.
    #[tokio::test]
    async fn test_operator_batch_claims_to_recipient() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![100, 200, 300], None)
            .await
            .unwrap();
        q.service.finalize(ORACLE, 3, 600).await.unwrap();
        q.service.set_operator(ALICE, CAROL, true).await.unwrap();

        let hints = q
            .service
            .find_checkpoint_hints_unbounded(vec![1, 2, 3])
            .await
            .unwrap();
        let claims: Vec<ClaimRequest> = [1u64, 2, 3]
            .iter()
            .zip(hints.iter())
            .map(|(&request_id, &hint)| ClaimRequest { request_id, hint })
            .collect();

        let payouts = q
            .service
            .claim_withdrawals_to(CAROL, claims, CAROL)
            .await
            .unwrap();
        assert_eq!(payouts, vec![100, 200, 300]);
        assert_eq!(q.share_accounting.transfers(), vec![(CAROL, 600)]);
    }

    /// Requests created for a third-party owner belong to that owner from
    /// the first moment.
    #[tokio::test]
    async fn test_request_on_behalf_of_other_owner() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![400], Some(BOB))
            .await
            .unwrap();

        assert_eq!(q.share_accounting.pulled(), vec![(ALICE, 400)]);
        assert_eq!(q.service.requests_of(BOB).await, vec![1]);
        assert!(q.service.requests_of(ALICE).await.is_empty());

        q.service.finalize(ORACLE, 1, 400).await.unwrap();
        assert_eq!(q.service.claim_withdrawal(BOB, 1, 1, None).await.unwrap(), 400);
    }

    /// The wrapped path converts at the wrapper rate before limits and
    /// pricing are applied.
    #[tokio::test]
    async fn test_wrapped_lifecycle_end_to_end() {
        let q = build_queue();
        // 1 wrapped = 1.5 value
        q.wrapped_token
            .set_rate(ShareRate(SHARE_RATE_PRECISION * 3 / 2));

        let ids = q
            .service
            .request_withdrawals_wrapped(ALICE, vec![1_000], None)
            .await
            .unwrap();
        assert_eq!(ids, vec![1]);
        assert_eq!(q.wrapped_token.pulled(), vec![(ALICE, 1_000)]);

        let status = q.service.withdrawal_status(vec![1]).await.unwrap();
        assert_eq!(status[0].par_value, 1_500);

        q.service.finalize(ORACLE, 1, 1_500).await.unwrap();
        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 1_500);
    }

    /// Pausing freezes the mutating surface mid-lifecycle and resuming
    /// picks up exactly where it stopped.
    #[tokio::test]
    async fn test_pause_and_resume_mid_lifecycle() {
        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![100, 200], None)
            .await
            .unwrap();
        q.service.finalize(ORACLE, 1, 100).await.unwrap();

        q.service.pause(ORACLE).await.unwrap();
        assert!(q.service.is_paused().await);
        assert!(q
            .service
            .request_withdrawals(BOB, vec![100], None)
            .await
            .is_err());
        assert!(q.service.finalize(ORACLE, 2, 200).await.is_err());
        assert!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.is_err());

        // Reads still serve while paused
        assert_eq!(q.service.last_request_id().await, 2);
        assert_eq!(q.service.locked_value_amount().await, 100);

        q.service.resume(ORACLE).await.unwrap();
        q.service.finalize(ORACLE, 2, 200).await.unwrap();
        assert_eq!(q.service.claim_withdrawal(ALICE, 1, 1, None).await.unwrap(), 100);
        assert_eq!(q.service.claim_withdrawal(ALICE, 2, 1, None).await.unwrap(), 200);
    }

    /// Events narrate the lifecycle in commit order and drain exactly once.
    #[tokio::test]
    async fn test_event_stream_matches_lifecycle() {
        use wq_engine::events::outgoing::QueueEvent;

        let q = build_queue();
        q.service
            .request_withdrawals(ALICE, vec![250], None)
            .await
            .unwrap();
        q.service.finalize(ORACLE, 1, 250).await.unwrap();
        q.service.transfer_from(ALICE, ALICE, BOB, 1).await.unwrap();
        q.service.claim_withdrawal(BOB, 1, 1, None).await.unwrap();

        let events = q.service.take_events().await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], QueueEvent::Requested(_)));
        assert!(matches!(events[1], QueueEvent::Finalized(_)));
        assert!(matches!(events[2], QueueEvent::Transferred(_)));
        assert!(matches!(events[3], QueueEvent::Claimed(_)));

        if let QueueEvent::Claimed(claimed) = &events[3] {
            assert_eq!(claimed.owner, BOB);
            assert_eq!(claimed.payout, 250);
        }
        assert!(q.service.take_events().await.is_empty());
    }
}
