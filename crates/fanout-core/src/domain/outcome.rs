//! Outcome model: how a consumer loop ended.
//!
//! Outcomes are per loop, not per item. A single failure retires the whole
//! loop for the rest of the run.

use serde::{Deserialize, Serialize};

use super::WorkerId;

/// Consumer loop state machine.
///
/// State transitions:
/// - Running -> Exited
///
/// Exited is terminal; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Running,
    Exited,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Exited)
    }
}

/// Terminal classification of a consumer loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// Ended by the run-wide cancellation once every item was accounted for.
    Stopped { worker: WorkerId, processed: usize },

    /// Gave up after a per-item failure; the item was redelivered.
    Failed {
        worker: WorkerId,
        processed: usize,
        error: String,
    },
}

impl LoopOutcome {
    pub fn worker(&self) -> WorkerId {
        match self {
            LoopOutcome::Stopped { worker, .. } | LoopOutcome::Failed { worker, .. } => *worker,
        }
    }

    /// Items this loop completed successfully before it ended.
    pub fn processed(&self) -> usize {
        match self {
            LoopOutcome::Stopped { processed, .. } | LoopOutcome::Failed { processed, .. } => {
                *processed
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoopOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_is_tagged() {
        let o = LoopOutcome::Failed {
            worker: WorkerId::new(1),
            processed: 2,
            error: "boom".to_string(),
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "failed");
        assert_eq!(v["worker"], 1);
        assert_eq!(v["error"], "boom");

        assert!(o.is_failed());
        assert_eq!(o.worker(), WorkerId::new(1));
        assert_eq!(o.processed(), 2);
    }

    #[test]
    fn only_exited_is_terminal() {
        assert!(!LoopState::Running.is_terminal());
        assert!(LoopState::Exited.is_terminal());
    }
}
