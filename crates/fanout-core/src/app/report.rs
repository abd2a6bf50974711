//! RunReport - 1 回の run の結果と履歴

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LoopOutcome, RunId, WorkerId};

/// Results of a finished run plus how each loop ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport<O> {
    pub run_id: RunId,
    pub label: String,

    /// Successful outputs in completion order.
    pub results: Vec<O>,

    /// One entry per worker, in worker order.
    pub outcomes: Vec<LoopOutcome>,

    /// How many times an item was put back after a failure.
    pub redelivered: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<O> RunReport<O> {
    /// Workers that retired after a failure.
    pub fn failed_workers(&self) -> Vec<WorkerId> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(LoopOutcome::worker)
            .collect()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
