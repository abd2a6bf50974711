//! Fixture workers shared by the integration tests.
#![allow(dead_code)]

use std::future::poll_fn;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;
use fanout_core::{Capability, Invocation, WorkError, Worker, WorkerPool};

pub type Output = (usize, u32);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Yields once, going to the back of the run queue.
///
/// `tokio::task::yield_now` parks the task on the defer list instead, which
/// does not keep the loops in turn.
pub async fn yield_in_turn() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}

/// Returns `(index, item)` after yielding once to the scheduler.
pub struct Indexed {
    pub index: usize,
}

#[async_trait]
impl Worker<u32> for Indexed {
    type Output = Output;

    fn provides(&self, capability: &Capability) -> bool {
        capability.as_str() == "run"
    }

    async fn invoke(&self, item: &u32, _invocation: &Invocation) -> Result<Output, WorkError> {
        yield_in_turn().await;
        Ok((self.index, *item))
    }
}

/// Fails on every item.
pub struct AlwaysFails {
    pub calls: AtomicUsize,
}

impl AlwaysFails {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Worker<u32> for AlwaysFails {
    type Output = Output;

    fn provides(&self, capability: &Capability) -> bool {
        capability.as_str() == "run"
    }

    async fn invoke(&self, item: &u32, _invocation: &Invocation) -> Result<Output, WorkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        yield_in_turn().await;
        Err(WorkError::new(format!("refusing item {item}")))
    }
}

/// Succeeds `budget` times, then fails.
pub struct FailsAfter {
    pub index: usize,
    pub budget: usize,
    calls: AtomicUsize,
}

impl FailsAfter {
    pub fn new(index: usize, budget: usize) -> Self {
        Self {
            index,
            budget,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Worker<u32> for FailsAfter {
    type Output = Output;

    fn provides(&self, capability: &Capability) -> bool {
        capability.as_str() == "run"
    }

    async fn invoke(&self, item: &u32, _invocation: &Invocation) -> Result<Output, WorkError> {
        yield_in_turn().await;
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
            return Err(WorkError::new("budget exhausted"));
        }
        Ok((self.index, *item))
    }
}

/// Sleeps before answering; used on the multi-thread runtime and for timeouts.
pub struct Sleepy {
    pub index: usize,
    pub delay: Duration,
}

#[async_trait]
impl Worker<u32> for Sleepy {
    type Output = Output;

    fn provides(&self, capability: &Capability) -> bool {
        capability.as_str() == "run"
    }

    async fn invoke(&self, item: &u32, _invocation: &Invocation) -> Result<Output, WorkError> {
        tokio::time::sleep(self.delay).await;
        Ok((self.index, *item))
    }
}

/// `scale` capability: item * args[0] + kwargs["offset"].
pub struct Scaler {
    pub index: usize,
}

#[async_trait]
impl Worker<u32> for Scaler {
    type Output = Output;

    fn provides(&self, capability: &Capability) -> bool {
        capability.as_str() == "scale"
    }

    async fn invoke(&self, item: &u32, invocation: &Invocation) -> Result<Output, WorkError> {
        let factor = invocation
            .args()
            .first()
            .and_then(|v| v.as_u64())
            .ok_or_else(|| WorkError::new("missing factor"))?;
        let offset = invocation
            .kwarg_value("offset")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok((self.index, (*item as u64 * factor + offset) as u32))
    }
}

pub fn indexed_pool(n: usize) -> WorkerPool<u32, Output> {
    (0..n)
        .map(|index| Arc::new(Indexed { index }) as Arc<dyn Worker<u32, Output = Output>>)
        .collect()
}

/// Results sorted by item, so they can be compared independent of completion order.
pub fn items_of(results: &[Output]) -> Vec<u32> {
    let mut items: Vec<u32> = results.iter().map(|(_, item)| *item).collect();
    items.sort_unstable();
    items
}
