//! Withdrawal Queue Service - Core business logic
//!
//! Every operation validates against current state first and mutates only
//! after the last fallible step, so a failure leaves no state change
//! behind. The single state lock serializes operations; outbound gateway
//! calls happen outside the lock, and value never leaves the queue before
//! the corresponding request is marked claimed.

use crate::domain::{
    derive_batch_rate, last_finalizable, last_finalizable_by_budget,
    last_finalizable_by_timestamp, preview_batch, BatchPreview, Capability, PackedQueueLimits,
    QueueLimits,
};
use crate::error::{WithdrawalQueueError, WqResult};
use crate::events::outgoing::{
    BatchFinalizedEvent, LimitsUpdatedEvent, PayoutTransferFailedEvent, QueueEvent,
    RequestTransferredEvent, WithdrawalClaimedEvent, WithdrawalRequestedEvent,
};
use crate::metrics;
use crate::ports::inbound::{
    ClaimRequest, FinalizationSummary, WithdrawalQueueApi, WithdrawalRequestStatus,
};
use crate::ports::outbound::{
    Clock, ShareAccountingGateway, SignedAuthorization, WrappedTokenGateway,
};
use crate::state::QueueState;
use crate::types::QueueConfig;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    AccountId, CheckpointIndex, RequestId, ShareRate, Timestamp, ValueAmount, ZERO_ADDRESS,
};
use std::sync::Arc;
use uuid::Uuid;

/// Withdrawal-queue service implementation.
pub struct WithdrawalQueueService<S, W, C>
where
    S: ShareAccountingGateway,
    W: WrappedTokenGateway,
    C: Clock,
{
    state: Arc<RwLock<QueueState>>,
    share_accounting: Arc<S>,
    wrapped_token: Arc<W>,
    clock: Arc<C>,
}

impl<S, W, C> WithdrawalQueueService<S, W, C>
where
    S: ShareAccountingGateway,
    W: WrappedTokenGateway,
    C: Clock,
{
    /// Create a new withdrawal-queue service.
    pub fn new(
        config: QueueConfig,
        share_accounting: Arc<S>,
        wrapped_token: Arc<W>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueueState::new(&config))),
            share_accounting,
            wrapped_token,
            clock,
        }
    }

    /// Grant a capability to a principal. Bootstrapping hook for the host;
    /// gated mutations go through the inbound API instead.
    pub fn grant_capability(&self, capability: Capability, principal: AccountId) {
        self.state.write().roles.grant(capability, principal);
    }

    /// Revoke a previously granted capability.
    pub fn revoke_capability(&self, capability: Capability, principal: AccountId) {
        self.state.write().roles.revoke(capability, principal);
    }

    /// Validate amounts against `limits` and return their total.
    fn validate_amounts(limits: &QueueLimits, amounts: &[ValueAmount]) -> WqResult<ValueAmount> {
        let mut total: ValueAmount = 0;
        for &amount in amounts {
            if amount < limits.min_request_amount {
                return Err(WithdrawalQueueError::RequestAmountTooSmall {
                    amount,
                    min: limits.min_request_amount,
                });
            }
            if amount > limits.max_request_amount {
                return Err(WithdrawalQueueError::RequestAmountTooLarge {
                    amount,
                    max: limits.max_request_amount,
                });
            }
            total = total
                .checked_add(amount)
                .ok_or(WithdrawalQueueError::ValueOverflow)?;
        }
        Ok(total)
    }

    /// Pre-pull validation shared by all request-creation paths: pause
    /// check plus amount bounds, returning the total to pull.
    fn prepare_creation(&self, amounts: &[ValueAmount]) -> WqResult<ValueAmount> {
        let state = self.state.read();
        state.ensure_not_paused()?;
        Self::validate_amounts(&state.limits, amounts)
    }

    /// Append one request per amount, all priced at `rate`. The funds were
    /// already pulled; amounts were validated before the pull, and the
    /// ledger re-checks them against the same limits.
    fn enqueue(
        &self,
        owner: AccountId,
        amounts: &[ValueAmount],
        rate: ShareRate,
    ) -> WqResult<Vec<RequestId>> {
        let timestamp = self.clock.now();
        let state = &mut *self.state.write();
        // The pre-pull check ran under an earlier lock; a pause committed
        // while the pull was in flight must still reject the append
        state.ensure_not_paused()?;
        let limits = state.limits;

        let mut ids = Vec::with_capacity(amounts.len());
        for &amount in amounts {
            let shares = rate
                .shares_for_value(amount)
                .ok_or(WithdrawalQueueError::ZeroShareRate)?;
            let request_id = state
                .ledger
                .append(owner, amount, shares, timestamp, &limits)?;
            state.ownership.record_created(owner, request_id);
            state.push_event(QueueEvent::Requested(WithdrawalRequestedEvent {
                request_id,
                owner,
                par_value: amount,
                shares,
                timestamp,
            }));
            ids.push(request_id);
        }

        metrics::record_requests_created(ids.len() as u64);
        tracing::debug!(
            owner = ?owner,
            count = ids.len(),
            last_request_id = state.ledger.last_request_id(),
            "enqueued withdrawal requests"
        );
        Ok(ids)
    }

    fn resolve_owner(caller: AccountId, owner: Option<AccountId>) -> WqResult<AccountId> {
        let owner = owner.unwrap_or(caller);
        if owner == ZERO_ADDRESS {
            return Err(WithdrawalQueueError::TransferToZeroAddress);
        }
        Ok(owner)
    }

    /// Convert wrapped amounts to value amounts at the wrapper's rate.
    async fn unwrap_amounts(&self, amounts: &[ValueAmount]) -> WqResult<Vec<ValueAmount>> {
        let mut values = Vec::with_capacity(amounts.len());
        for &amount in amounts {
            values.push(self.wrapped_token.unwrapped_value(amount).await?);
        }
        Ok(values)
    }

    /// Release a committed payout from custody. The claim itself already
    /// stands; a transfer failure is recorded as an event and reported so
    /// the host can settle the amount out of band.
    async fn deliver_payout(&self, recipient: AccountId, payout: ValueAmount) -> WqResult<()> {
        if payout == 0 {
            return Ok(());
        }
        if let Err(e) = self.share_accounting.transfer_value(recipient, payout).await {
            tracing::error!("Failed to release claimed payout: {:?}", e);
            let reason = e.to_string();
            self.state
                .write()
                .push_event(QueueEvent::TransferFailed(PayoutTransferFailedEvent {
                    recipient,
                    payout,
                    reason: reason.clone(),
                }));
            return Err(WithdrawalQueueError::PayoutTransferFailed { payout, reason });
        }
        Ok(())
    }

    /// Validate unwrapped values against the limits and return the total
    /// wrapped amount to pull.
    fn prepare_creation_wrapped(
        &self,
        values: &[ValueAmount],
        wrapped_amounts: &[ValueAmount],
    ) -> WqResult<ValueAmount> {
        let state = self.state.read();
        state.ensure_not_paused()?;
        Self::validate_amounts(&state.limits, values)?;
        let mut total: ValueAmount = 0;
        for &amount in wrapped_amounts {
            total = total
                .checked_add(amount)
                .ok_or(WithdrawalQueueError::ValueOverflow)?;
        }
        Ok(total)
    }
}

#[async_trait]
impl<S, W, C> WithdrawalQueueApi for WithdrawalQueueService<S, W, C>
where
    S: ShareAccountingGateway + 'static,
    W: WrappedTokenGateway + 'static,
    C: Clock + 'static,
{
    async fn request_withdrawals(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
    ) -> WqResult<Vec<RequestId>> {
        let owner = Self::resolve_owner(caller, owner)?;
        let total = self.prepare_creation(&amounts)?;
        if amounts.is_empty() {
            return Ok(Vec::new());
        }

        let rate = self.share_accounting.current_share_rate().await?;
        if rate.is_zero() {
            return Err(WithdrawalQueueError::ZeroShareRate);
        }
        self.share_accounting.pull_value(caller, total).await?;

        self.enqueue(owner, &amounts, rate)
    }

    async fn request_withdrawals_wrapped(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
    ) -> WqResult<Vec<RequestId>> {
        let owner = Self::resolve_owner(caller, owner)?;
        self.state.read().ensure_not_paused()?;
        if amounts.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.unwrap_amounts(&amounts).await?;
        let total_wrapped = self.prepare_creation_wrapped(&values, &amounts)?;

        let rate = self.share_accounting.current_share_rate().await?;
        if rate.is_zero() {
            return Err(WithdrawalQueueError::ZeroShareRate);
        }
        self.wrapped_token.pull_wrapped(caller, total_wrapped).await?;

        self.enqueue(owner, &values, rate)
    }

    async fn request_withdrawals_wrapped_with_authorization(
        &self,
        caller: AccountId,
        amounts: Vec<ValueAmount>,
        owner: Option<AccountId>,
        authorization: SignedAuthorization,
    ) -> WqResult<Vec<RequestId>> {
        let owner = Self::resolve_owner(caller, owner)?;
        self.state.read().ensure_not_paused()?;

        let now = self.clock.now();
        if now > authorization.expiry {
            return Err(WithdrawalQueueError::AuthorizationExpired {
                expiry: authorization.expiry,
                now,
            });
        }
        if amounts.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.unwrap_amounts(&amounts).await?;
        let total_wrapped = self.prepare_creation_wrapped(&values, &amounts)?;

        let rate = self.share_accounting.current_share_rate().await?;
        if rate.is_zero() {
            return Err(WithdrawalQueueError::ZeroShareRate);
        }
        self.wrapped_token
            .pull_wrapped_with_authorization(&authorization, total_wrapped)
            .await?;

        self.enqueue(owner, &values, rate)
    }

    async fn finalize(
        &self,
        caller: AccountId,
        target_id: RequestId,
        value_attached: ValueAmount,
    ) -> WqResult<FinalizationSummary> {
        if value_attached == 0 {
            return Err(WithdrawalQueueError::ZeroBudget);
        }

        let (summary, shares_to_burn) = {
            let state = &mut *self.state.write();
            state.ensure_not_paused()?;
            state.roles.require(Capability::Finalize, &caller)?;

            let first = state.last_finalized_request_id + 1;
            if target_id < first || target_id > state.ledger.last_request_id() {
                return Err(WithdrawalQueueError::InvalidRequestIdRange {
                    first,
                    last: target_id,
                });
            }

            let (_, batch_shares) = state.ledger.range_totals(first, target_id)?;
            let rate = derive_batch_rate(value_attached, batch_shares)?;
            let preview = preview_batch(&state.ledger, first, target_id, rate)?;

            let applied = state.apply_finalization(target_id, rate, preview.value_to_lock);
            state.push_event(QueueEvent::Finalized(BatchFinalizedEvent {
                correlation_id: Uuid::new_v4(),
                first_request_id: applied.first_request_id,
                last_request_id: target_id,
                value_locked: applied.value_locked,
                shares_burned: preview.shares_to_burn,
                max_share_rate: rate,
                checkpoint_index: applied.checkpoint_index,
            }));

            metrics::record_batch_finalized(applied.checkpoint_created);
            metrics::set_locked_value(state.locked_value_amount);
            metrics::set_last_finalized_request_id(target_id);
            tracing::info!(
                first = applied.first_request_id,
                target = target_id,
                value_locked = applied.value_locked,
                rate = rate.0,
                checkpoint = applied.checkpoint_index,
                merged = !applied.checkpoint_created,
                "finalized withdrawal batch"
            );

            (
                FinalizationSummary {
                    value_locked: applied.value_locked,
                    shares_burned: preview.shares_to_burn,
                    checkpoint_index: applied.checkpoint_index,
                    checkpoint_created: applied.checkpoint_created,
                },
                preview.shares_to_burn,
            )
        };

        // The batch is committed and must not unwind; a failed burn is
        // reported so the host can retry it against the collaborator
        if let Err(e) = self.share_accounting.burn_shares(shares_to_burn).await {
            tracing::error!("Failed to burn shares for finalized batch: {:?}", e);
            return Err(WithdrawalQueueError::ShareBurnFailed {
                shares: shares_to_burn,
                reason: e.to_string(),
            });
        }

        Ok(summary)
    }

    async fn preview_finalization_batch(
        &self,
        target_id: RequestId,
        max_share_rate: ShareRate,
    ) -> WqResult<BatchPreview> {
        let state = self.state.read();
        let first = state.last_finalized_request_id + 1;
        if target_id < first || target_id > state.ledger.last_request_id() {
            return Err(WithdrawalQueueError::InvalidRequestIdRange {
                first,
                last: target_id,
            });
        }
        preview_batch(&state.ledger, first, target_id, max_share_rate)
    }

    async fn find_last_finalizable_request_id_by_timestamp(
        &self,
        max_timestamp: Timestamp,
        first: RequestId,
        last: RequestId,
    ) -> WqResult<RequestId> {
        let state = self.state.read();
        last_finalizable_by_timestamp(
            &state.ledger,
            max_timestamp,
            first,
            last,
            state.last_finalized_request_id,
        )
    }

    async fn find_last_finalizable_request_id_by_budget(
        &self,
        max_value: ValueAmount,
        max_share_rate: ShareRate,
        first: RequestId,
        last: RequestId,
    ) -> WqResult<RequestId> {
        let state = self.state.read();
        last_finalizable_by_budget(
            &state.ledger,
            max_value,
            max_share_rate,
            first,
            last,
            state.last_finalized_request_id,
        )
    }

    async fn find_last_finalizable_request_id(
        &self,
        max_value: ValueAmount,
        max_share_rate: ShareRate,
        max_timestamp: Timestamp,
    ) -> WqResult<RequestId> {
        let state = self.state.read();
        last_finalizable(
            &state.ledger,
            max_value,
            max_share_rate,
            max_timestamp,
            state.last_finalized_request_id,
        )
    }

    async fn find_checkpoint_hints(
        &self,
        ids: Vec<RequestId>,
        first_index: CheckpointIndex,
        last_index: CheckpointIndex,
    ) -> WqResult<Vec<CheckpointIndex>> {
        let state = self.state.read();
        state.checkpoints.find_hints(
            &ids,
            first_index,
            last_index,
            state.last_finalized_request_id,
            state.ledger.last_request_id(),
        )
    }

    async fn find_checkpoint_hints_unbounded(
        &self,
        ids: Vec<RequestId>,
    ) -> WqResult<Vec<CheckpointIndex>> {
        let state = self.state.read();
        state.checkpoints.find_hints(
            &ids,
            1,
            state.checkpoints.last_checkpoint_index(),
            state.last_finalized_request_id,
            state.ledger.last_request_id(),
        )
    }

    async fn withdrawal_status(
        &self,
        ids: Vec<RequestId>,
    ) -> WqResult<Vec<WithdrawalRequestStatus>> {
        let state = self.state.read();
        let mut statuses = Vec::with_capacity(ids.len());
        for id in ids {
            let request = state
                .ledger
                .get(id)
                .ok_or(WithdrawalQueueError::InvalidRequestId { request_id: id })?;
            statuses.push(WithdrawalRequestStatus {
                owner: request.owner,
                par_value: request.par_value,
                shares: request.shares,
                timestamp: request.timestamp,
                finalized: request.finalized,
                claimed: request.claimed,
            });
        }
        Ok(statuses)
    }

    async fn claimable_value(&self, claims: Vec<ClaimRequest>) -> WqResult<Vec<ValueAmount>> {
        let state = self.state.read();
        claims
            .iter()
            .map(|claim| state.validate_claim(claim.request_id, claim.hint))
            .collect()
    }

    async fn claim_withdrawal(
        &self,
        caller: AccountId,
        request_id: RequestId,
        hint: CheckpointIndex,
        recipient: Option<AccountId>,
    ) -> WqResult<ValueAmount> {
        if recipient == Some(ZERO_ADDRESS) {
            return Err(WithdrawalQueueError::TransferToZeroAddress);
        }

        let (payout, recipient) = {
            let state = &mut *self.state.write();
            state.ensure_not_paused()?;

            let payout = state.validate_claim(request_id, hint)?;
            let owner = state
                .ledger
                .get(request_id)
                .map(|r| r.owner)
                .ok_or(WithdrawalQueueError::RequestNotFoundOrNotFinalized { request_id })?;
            if !state.ownership.is_authorized(&caller, &owner, request_id) {
                return Err(WithdrawalQueueError::NotOwnerOrApproved { caller });
            }

            // Claimed flag and locked-value decrement land before any value
            // leaves the queue
            let owner = state.apply_claim(request_id, payout);
            let recipient = recipient.unwrap_or(owner);
            state.push_event(QueueEvent::Claimed(WithdrawalClaimedEvent {
                request_id,
                owner,
                recipient,
                payout,
            }));

            metrics::record_withdrawal_claimed();
            metrics::set_locked_value(state.locked_value_amount);
            tracing::info!(request_id, payout, "claimed withdrawal");

            (payout, recipient)
        };

        self.deliver_payout(recipient, payout).await?;
        Ok(payout)
    }

    async fn claim_withdrawals_to(
        &self,
        caller: AccountId,
        claims: Vec<ClaimRequest>,
        recipient: AccountId,
    ) -> WqResult<Vec<ValueAmount>> {
        if recipient == ZERO_ADDRESS {
            return Err(WithdrawalQueueError::TransferToZeroAddress);
        }

        let (payouts, total) = {
            let state = &mut *self.state.write();
            state.ensure_not_paused()?;

            // Phase 1: validate every entry; nothing is mutated until all
            // pass, so one bad entry aborts the whole batch
            let mut seen = std::collections::HashSet::with_capacity(claims.len());
            let mut payouts = Vec::with_capacity(claims.len());
            for claim in &claims {
                if !seen.insert(claim.request_id) {
                    return Err(WithdrawalQueueError::RequestAlreadyClaimed {
                        request_id: claim.request_id,
                    });
                }
                let payout = state.validate_claim(claim.request_id, claim.hint)?;
                let owner = state
                    .ledger
                    .get(claim.request_id)
                    .map(|r| r.owner)
                    .ok_or(WithdrawalQueueError::RequestNotFoundOrNotFinalized {
                        request_id: claim.request_id,
                    })?;
                if !state
                    .ownership
                    .is_authorized(&caller, &owner, claim.request_id)
                {
                    return Err(WithdrawalQueueError::NotOwnerOrApproved { caller });
                }
                payouts.push(payout);
            }

            // Phase 2: commit
            let mut total: ValueAmount = 0;
            for (claim, &payout) in claims.iter().zip(payouts.iter()) {
                let owner = state.apply_claim(claim.request_id, payout);
                state.push_event(QueueEvent::Claimed(WithdrawalClaimedEvent {
                    request_id: claim.request_id,
                    owner,
                    recipient,
                    payout,
                }));
                metrics::record_withdrawal_claimed();
                total = total.saturating_add(payout);
            }
            metrics::set_locked_value(state.locked_value_amount);
            tracing::info!(count = claims.len(), total, "claimed withdrawal batch");

            (payouts, total)
        };

        self.deliver_payout(recipient, total).await?;
        Ok(payouts)
    }

    async fn transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        request_id: RequestId,
    ) -> WqResult<()> {
        if to == ZERO_ADDRESS {
            return Err(WithdrawalQueueError::TransferToZeroAddress);
        }

        let state = &mut *self.state.write();
        let request = state
            .ledger
            .get(request_id)
            .ok_or(WithdrawalQueueError::InvalidRequestId { request_id })?;
        if request.claimed {
            return Err(WithdrawalQueueError::RequestAlreadyClaimed { request_id });
        }
        if request.owner != from {
            return Err(WithdrawalQueueError::NotOwnerOrApproved { caller: from });
        }
        if !state.ownership.is_authorized(&caller, &from, request_id) {
            return Err(WithdrawalQueueError::NotOwnerOrApproved { caller });
        }

        if let Some(request) = state.ledger.get_mut(request_id) {
            request.owner = to;
        }
        state.ownership.record_transferred(from, to, request_id);
        state.push_event(QueueEvent::Transferred(RequestTransferredEvent {
            request_id,
            from,
            to,
        }));
        tracing::debug!(request_id, from = ?from, to = ?to, "transferred request");
        Ok(())
    }

    async fn approve(
        &self,
        caller: AccountId,
        request_id: RequestId,
        delegate: Option<AccountId>,
    ) -> WqResult<()> {
        let state = &mut *self.state.write();
        let request = state
            .ledger
            .get(request_id)
            .ok_or(WithdrawalQueueError::InvalidRequestId { request_id })?;
        if request.claimed {
            return Err(WithdrawalQueueError::RequestAlreadyClaimed { request_id });
        }
        if request.owner != caller {
            return Err(WithdrawalQueueError::NotOwnerOrApproved { caller });
        }
        state.ownership.set_approval(request_id, delegate);
        Ok(())
    }

    async fn set_operator(
        &self,
        caller: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> WqResult<()> {
        if operator == ZERO_ADDRESS {
            return Err(WithdrawalQueueError::TransferToZeroAddress);
        }
        self.state
            .write()
            .ownership
            .set_operator(caller, operator, approved);
        Ok(())
    }

    async fn set_limits(&self, caller: AccountId, limits: PackedQueueLimits) -> WqResult<()> {
        let state = &mut *self.state.write();
        state.roles.require(Capability::ManageLimits, &caller)?;

        let wide = limits.decode();
        state.limits = wide;
        state.push_event(QueueEvent::LimitsUpdated(LimitsUpdatedEvent {
            min_request_amount: wide.min_request_amount,
            max_request_amount: wide.max_request_amount,
        }));
        tracing::info!(
            min = wide.min_request_amount,
            max = wide.max_request_amount,
            "updated request amount limits"
        );
        Ok(())
    }

    async fn pause(&self, caller: AccountId) -> WqResult<()> {
        let state = &mut *self.state.write();
        state.roles.require(Capability::Pause, &caller)?;
        if state.paused {
            return Err(WithdrawalQueueError::QueueAlreadyPaused);
        }
        state.paused = true;
        state.push_event(QueueEvent::Paused { by: caller });
        metrics::set_queue_paused(true);
        tracing::warn!(by = ?caller, "withdrawal queue paused");
        Ok(())
    }

    async fn resume(&self, caller: AccountId) -> WqResult<()> {
        let state = &mut *self.state.write();
        state.roles.require(Capability::Resume, &caller)?;
        if !state.paused {
            return Err(WithdrawalQueueError::QueueNotPaused);
        }
        state.paused = false;
        state.push_event(QueueEvent::Resumed { by: caller });
        metrics::set_queue_paused(false);
        tracing::info!(by = ?caller, "withdrawal queue resumed");
        Ok(())
    }

    async fn is_paused(&self) -> bool {
        self.state.read().paused
    }

    async fn last_request_id(&self) -> RequestId {
        self.state.read().ledger.last_request_id()
    }

    async fn last_finalized_request_id(&self) -> RequestId {
        self.state.read().last_finalized_request_id
    }

    async fn locked_value_amount(&self) -> ValueAmount {
        self.state.read().locked_value_amount
    }

    async fn last_checkpoint_index(&self) -> CheckpointIndex {
        self.state.read().checkpoints.last_checkpoint_index()
    }

    async fn unfinalized_request_count(&self) -> u64 {
        self.state.read().unfinalized_request_count()
    }

    async fn unfinalized_value(&self) -> ValueAmount {
        self.state.read().unfinalized_value()
    }

    async fn requests_of(&self, owner: AccountId) -> Vec<RequestId> {
        self.state.read().ownership.requests_of(&owner)
    }

    async fn take_events(&self) -> Vec<QueueEvent> {
        self.state.write().take_events()
    }
}
