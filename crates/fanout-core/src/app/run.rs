//! State shared by every consumer loop of one run.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::Invocation;
use crate::queue::WorkQueue;

/// Run-scoped state: queue, results, cancellation.
///
/// Created at the start of `perform` and dropped when it returns; nothing
/// here outlives a run.
pub(crate) struct RunContext<I, O> {
    pub(crate) queue: WorkQueue<I>,
    results: Mutex<Vec<O>>,
    expected: usize,
    pub(crate) cancel: CancellationToken,
    pub(crate) invocation: Invocation,
    pub(crate) invocation_timeout: Option<Duration>,
}

impl<I, O> RunContext<I, O> {
    pub(crate) fn new(
        expected: usize,
        invocation: Invocation,
        invocation_timeout: Option<Duration>,
    ) -> Self {
        Self {
            queue: WorkQueue::new(),
            results: Mutex::new(Vec::with_capacity(expected)),
            expected,
            cancel: CancellationToken::new(),
            invocation,
            invocation_timeout,
        }
    }

    pub(crate) fn expected(&self) -> usize {
        self.expected
    }

    /// Append one success; returns how many are recorded now.
    pub(crate) async fn record(&self, output: O) -> usize {
        let mut results = self.results.lock().await;
        results.push(output);
        results.len()
    }

    pub(crate) async fn recorded(&self) -> usize {
        self.results.lock().await.len()
    }

    /// Every item has a result.
    pub(crate) async fn is_complete(&self) -> bool {
        self.recorded().await == self.expected
    }

    pub(crate) async fn take_results(&self) -> Vec<O> {
        std::mem::take(&mut *self.results.lock().await)
    }
}
