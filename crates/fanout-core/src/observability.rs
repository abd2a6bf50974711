use serde::{Deserialize, Serialize};

/// Point-in-time view of a work queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Items waiting to be dequeued.
    pub queued: usize,
    /// Ledger value: queued plus checked out and not yet settled.
    pub unfinished: usize,
    /// Items put back after a worker failed on them.
    pub redelivered: usize,
}
