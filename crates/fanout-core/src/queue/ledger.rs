//! Completion ledger: outstanding-work counter with a drain signal.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::error::QueueError;

/// Counts enqueued units (retries included) that have not been acknowledged.
///
/// The channel length cannot stand in for this: a redelivered item is a new
/// push but the same logical unit of work.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    unfinished: AtomicUsize,
    drained: Notify,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, n: usize) {
        self.unfinished.fetch_add(n, Ordering::AcqRel);
    }

    /// Decrement by one. Wakes every drain waiter when the count reaches zero.
    pub(crate) fn settle(&self) -> Result<usize, QueueError> {
        let prev = self
            .unfinished
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| QueueError::AcknowledgedTooManyTimes)?;

        let now = prev - 1;
        if now == 0 {
            self.drained.notify_waiters();
        }
        Ok(now)
    }

    pub(crate) fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::Acquire)
    }

    pub(crate) async fn wait_drained(&self) {
        loop {
            // register before reading the counter so a settle() in between is not missed
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }
}
