//! Run-length-encoded discount history
//!
//! One checkpoint per stretch of finalized requests that share a discount
//! rate. A checkpoint covers `[from_request_id, next.from_request_id - 1]`,
//! or through the last finalized id for the final checkpoint. Lookup is
//! binary search over `from_request_id`, never a linear scan.

use crate::error::{WithdrawalQueueError, WqResult};
use serde::{Deserialize, Serialize};
use shared_types::{CheckpointIndex, RequestId, ShareRate};

/// Discount rate effective from a given request id onward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// First request id this checkpoint's rate applies to
    pub from_request_id: RequestId,
    /// Share-to-value conversion rate for the covered range
    pub max_share_rate: ShareRate,
}

/// Growable, 1-indexed checkpoint array.
#[derive(Debug, Default)]
pub struct CheckpointHistory {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the most recent checkpoint; 0 while empty.
    pub fn last_checkpoint_index(&self) -> CheckpointIndex {
        self.checkpoints.len() as CheckpointIndex
    }

    /// Look up a checkpoint by 1-based index.
    pub fn get(&self, index: CheckpointIndex) -> Option<&Checkpoint> {
        if index == 0 {
            return None;
        }
        self.checkpoints.get(index as usize - 1)
    }

    /// Record the rate for a batch starting at `from_request_id`.
    ///
    /// If the rate matches the previous checkpoint the existing coverage
    /// silently extends and no entry is appended. Returns the covering
    /// checkpoint index and whether a new entry was created.
    pub fn record(
        &mut self,
        from_request_id: RequestId,
        rate: ShareRate,
    ) -> (CheckpointIndex, bool) {
        if let Some(last) = self.checkpoints.last() {
            debug_assert!(from_request_id > last.from_request_id);
            if last.max_share_rate == rate {
                return (self.last_checkpoint_index(), false);
            }
        }
        self.checkpoints.push(Checkpoint {
            from_request_id,
            max_share_rate: rate,
        });
        (self.last_checkpoint_index(), true)
    }

    /// Whether `hint` is the checkpoint covering `request_id`.
    ///
    /// Callers must have established that `request_id` is finalized; this
    /// only brackets the id between `from_request_id` values.
    pub fn is_valid_hint(&self, hint: CheckpointIndex, request_id: RequestId) -> bool {
        let checkpoint = match self.get(hint) {
            Some(c) => c,
            None => return false,
        };
        if checkpoint.from_request_id > request_id {
            return false;
        }
        // The final checkpoint is open-ended
        match self.get(hint + 1) {
            Some(next) => next.from_request_id > request_id,
            None => true,
        }
    }

    /// Binary-search the inclusive index range `[first_index, last_index]`
    /// for the checkpoint covering `request_id`.
    ///
    /// Returns `None` when the covering checkpoint lies outside the bound.
    pub fn covering_index(
        &self,
        request_id: RequestId,
        first_index: CheckpointIndex,
        last_index: CheckpointIndex,
    ) -> Option<CheckpointIndex> {
        let lo = first_index as usize;
        let hi = last_index as usize;
        let window = &self.checkpoints[lo - 1..hi];
        let covered = window.partition_point(|c| c.from_request_id <= request_id);
        if covered == 0 {
            // Covering checkpoint starts before the window
            return None;
        }
        let candidate = lo - 1 + covered - 1; // 0-based
        if let Some(next) = self.checkpoints.get(candidate + 1) {
            if next.from_request_id <= request_id {
                // Covering checkpoint starts after the window
                return None;
            }
        }
        Some(candidate as CheckpointIndex + 1)
    }

    /// Resolve covering-checkpoint hints for a sorted list of request ids.
    ///
    /// Per id: the covering checkpoint index within `[first_index,
    /// last_index]`, or 0 when the id is not finalized or its checkpoint is
    /// outside the bound. Ids that were never issued fail the whole call.
    pub fn find_hints(
        &self,
        ids: &[RequestId],
        first_index: CheckpointIndex,
        last_index: CheckpointIndex,
        last_finalized_request_id: RequestId,
        last_request_id: RequestId,
    ) -> WqResult<Vec<CheckpointIndex>> {
        let empty_history = self.checkpoints.is_empty() && first_index == 1 && last_index == 0;
        if !empty_history
            && (first_index == 0
                || first_index > last_index
                || last_index > self.last_checkpoint_index())
        {
            return Err(WithdrawalQueueError::InvalidRequestIdRange {
                first: first_index,
                last: last_index,
            });
        }

        let mut hints = Vec::with_capacity(ids.len());
        let mut prev_id = 0;
        for &id in ids {
            // Ordering is a precondition on the whole input, checked before
            // any per-id lookup
            if id < prev_id {
                return Err(WithdrawalQueueError::RequestIdsNotSorted);
            }
            prev_id = id;
            if id == 0 || id > last_request_id {
                return Err(WithdrawalQueueError::RequestNotFoundOrNotFinalized {
                    request_id: id,
                });
            }

            if id > last_finalized_request_id || empty_history {
                hints.push(0);
                continue;
            }
            hints.push(self.covering_index(id, first_index, last_index).unwrap_or(0));
        }
        Ok(hints)
    }
}
