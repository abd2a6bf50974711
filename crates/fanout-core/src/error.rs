use thiserror::Error;

use crate::domain::{Capability, WorkerId};

/// Ledger misuse on the work queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("acknowledge called more times than items were enqueued")]
    AcknowledgedTooManyTimes,
}

/// Run-level failures surfaced by the coordinator.
///
/// Per-item capability failures never show up here: the consumer loop absorbs
/// them, redelivers the item and retires. Only the aggregate verdict does.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("all {workers} workers failed ({completed} items completed before the last one gave up)")]
    AllWorkersFailed { workers: usize, completed: usize },

    #[error("capability not found: worker={worker} capability={capability}")]
    CapabilityNotFound {
        worker: WorkerId,
        capability: Capability,
    },

    #[error("no workers to process {items} items")]
    NoWorkers { items: usize },

    #[error("consumer loop for worker={worker} panicked")]
    LoopPanicked { worker: WorkerId },

    #[error("run drained with {recorded} results recorded, expected {expected}")]
    Incomplete { expected: usize, recorded: usize },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl EngineError {
    /// Is this the "every worker gave up" verdict?
    pub fn is_all_workers_failed(&self) -> bool {
        matches!(self, EngineError::AllWorkersFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_workers_failed_is_distinguishable() {
        let err = EngineError::AllWorkersFailed {
            workers: 2,
            completed: 0,
        };
        assert!(err.is_all_workers_failed());
        assert!(err.to_string().contains("all 2 workers failed"));

        let err = EngineError::NoWorkers { items: 3 };
        assert!(!err.is_all_workers_failed());
    }

    #[test]
    fn queue_error_converts() {
        let err: EngineError = QueueError::AcknowledgedTooManyTimes.into();
        assert!(matches!(err, EngineError::Queue(_)));
    }
}
