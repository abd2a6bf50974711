//! In-memory work queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, Notify};

use super::ledger::Ledger;
use crate::error::QueueError;
use crate::observability::QueueCounts;

/// Unbounded FIFO of pending items plus the completion ledger.
///
/// Design intent:
/// - `dequeue` hands out a [`Lease`]; the consumer settles it exactly once
///   with `ack` or `redeliver`.
/// - The ledger counts every push (original or retry) and every settle, so
///   `await_drained` only returns once nothing is queued or checked out.
pub struct WorkQueue<I> {
    items: Mutex<VecDeque<I>>,
    available: Notify,
    ledger: Ledger,
    redelivered: AtomicUsize,
}

impl<I> WorkQueue<I> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            ledger: Ledger::new(),
            redelivered: AtomicUsize::new(0),
        }
    }

    /// Push one item to the back. Always succeeds.
    pub async fn enqueue(&self, item: I) {
        {
            let mut items = self.items.lock().await;
            self.ledger.add(1);
            items.push_back(item);
        }
        // notify outside the lock
        self.available.notify_one();
    }

    /// Push every item in order.
    pub async fn enqueue_all(&self, batch: impl IntoIterator<Item = I>) {
        let pushed = {
            let mut items = self.items.lock().await;
            let before = items.len();
            items.extend(batch);
            let pushed = items.len() - before;
            self.ledger.add(pushed);
            pushed
        };
        for _ in 0..pushed {
            self.available.notify_one();
        }
    }

    /// Take the front item, waiting while the queue is empty.
    pub async fn dequeue(&self) -> Lease<'_, I> {
        loop {
            {
                let mut items = self.items.lock().await;
                if let Some(item) = items.pop_front() {
                    return Lease { queue: self, item };
                }
            }
            // a notify_one() that lands before we start waiting leaves a permit behind
            self.available.notified().await;
        }
    }

    /// Mark one dequeued unit as finished.
    ///
    /// Must be called exactly once per dequeue; [`Lease`] does this for you.
    pub fn acknowledge(&self) -> Result<(), QueueError> {
        self.ledger.settle().map(|_| ())
    }

    /// Wait until every enqueued unit, retries included, is acknowledged.
    pub async fn await_drained(&self) {
        self.ledger.wait_drained().await
    }

    pub fn unfinished(&self) -> usize {
        self.ledger.unfinished()
    }

    pub fn redelivered(&self) -> usize {
        self.redelivered.load(Ordering::Relaxed)
    }

    pub async fn counts(&self) -> QueueCounts {
        let queued = self.items.lock().await.len();
        QueueCounts {
            queued,
            unfinished: self.unfinished(),
            redelivered: self.redelivered(),
        }
    }

    async fn push_back_and_settle(&self, item: I) -> Result<(), QueueError> {
        {
            let mut items = self.items.lock().await;
            // re-enqueue first: the ledger must not touch zero between the two steps
            self.ledger.add(1);
            items.push_back(item);
            self.ledger.settle()?;
        }
        self.redelivered.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();
        Ok(())
    }
}

impl<I> Default for WorkQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A dequeued item. Settle it with [`Lease::ack`] or [`Lease::redeliver`].
#[must_use = "a lease must be acked or redelivered, otherwise the queue never drains"]
pub struct Lease<'q, I> {
    queue: &'q WorkQueue<I>,
    item: I,
}

impl<'q, I> Lease<'q, I> {
    pub fn item(&self) -> &I {
        &self.item
    }

    /// Processing succeeded.
    pub fn ack(self) -> Result<(), QueueError> {
        self.queue.acknowledge()
    }

    /// Processing failed: put the item back for another consumer and settle
    /// this dequeue, as one step.
    pub async fn redeliver(self) -> Result<(), QueueError> {
        let Lease { queue, item } = self;
        queue.push_back_and_settle(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn enqueue_and_counts() {
        let queue = WorkQueue::new();
        queue.enqueue_all(["a", "b"]).await;
        queue.enqueue("c").await;

        let counts = queue.counts().await;
        assert_eq!(counts.queued, 3);
        assert_eq!(counts.unfinished, 3);
        assert_eq!(counts.redelivered, 0);
    }

    #[tokio::test]
    async fn dequeue_is_fifo() {
        let queue = WorkQueue::new();
        queue.enqueue_all(0..3).await;

        let mut seen = Vec::new();
        for _ in 0..3 {
            let lease = queue.dequeue().await;
            seen.push(*lease.item());
            lease.ack().unwrap();
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(queue.unfinished(), 0);
    }

    #[tokio::test]
    async fn dequeued_but_unacked_still_counts() {
        let queue = WorkQueue::new();
        queue.enqueue(1).await;

        let lease = queue.dequeue().await;
        let counts = queue.counts().await;
        assert_eq!(counts.queued, 0);
        assert_eq!(counts.unfinished, 1);

        lease.ack().unwrap();
        assert_eq!(queue.unfinished(), 0);
    }

    #[tokio::test]
    async fn redeliver_goes_to_the_back_and_keeps_the_ledger() {
        let queue = WorkQueue::new();
        queue.enqueue_all(["x", "y"]).await;

        let lease = queue.dequeue().await;
        assert_eq!(*lease.item(), "x");
        lease.redeliver().await.unwrap();

        let counts = queue.counts().await;
        assert_eq!(counts.queued, 2);
        assert_eq!(counts.unfinished, 2);
        assert_eq!(counts.redelivered, 1);

        assert_eq!(*queue.dequeue().await.item(), "y");
    }

    #[tokio::test]
    async fn redeliver_of_the_last_item_does_not_drain() {
        let queue = WorkQueue::new();
        queue.enqueue(7).await;

        queue.dequeue().await.redeliver().await.unwrap();

        let drained = tokio::time::timeout(Duration::from_millis(50), queue.await_drained()).await;
        assert!(drained.is_err());
        assert_eq!(queue.unfinished(), 1);
    }

    #[tokio::test]
    async fn acknowledge_too_many_times_is_an_error() {
        let queue: WorkQueue<u8> = WorkQueue::new();
        assert_eq!(
            queue.acknowledge(),
            Err(QueueError::AcknowledgedTooManyTimes)
        );
    }

    #[tokio::test]
    async fn dequeue_waits_for_enqueue() {
        let queue = Arc::new(WorkQueue::new());

        let consumer = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move {
                let lease = queue.dequeue().await;
                let item = *lease.item();
                lease.ack().unwrap();
                item
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.enqueue(42).await;
        let item = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item, 42);
    }

    #[tokio::test]
    async fn await_drained_returns_after_last_ack() {
        let queue = Arc::new(WorkQueue::new());
        queue.enqueue_all(["a", "b"]).await;

        let drained = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.await_drained().await }
        });

        queue.dequeue().await.ack().unwrap();
        queue.dequeue().await.ack().unwrap();

        tokio::time::timeout(Duration::from_secs(1), drained)
            .await
            .unwrap()
            .unwrap();
    }
}
