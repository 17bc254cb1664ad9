use crate::domain::limits::QueueLimits;

/// Withdrawal-queue configuration
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Per-request amount bounds
    pub limits: QueueLimits,
    /// Start in the paused state; requires an explicit resume before the
    /// queue accepts mutating calls
    pub start_paused: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            limits: QueueLimits::default(),
            start_paused: false,
        }
    }
}
