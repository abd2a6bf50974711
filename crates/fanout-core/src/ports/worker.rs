//! Worker port - エンジンから呼び出し側のワーカーへの入り口
//!
//! ワーカーは位置（WorkerId）だけで識別され、名前付き capability を
//! アイテムごとに非同期で実行する。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Capability, Invocation, WorkError};

/// A worker processes one item at a time through a named capability.
///
/// `provides` is checked once per run, before any item is handed out, so a
/// misspelled capability fails fast instead of retiring every loop.
#[async_trait]
pub trait Worker<I>: Send + Sync {
    type Output: Send + 'static;

    /// Does this worker implement `capability`?
    fn provides(&self, capability: &Capability) -> bool;

    /// Run `invocation.capability()` on one item.
    ///
    /// The positional and keyword arguments in `invocation` are the same for
    /// every call in a run.
    async fn invoke(&self, item: &I, invocation: &Invocation) -> Result<Self::Output, WorkError>;
}

/// The worker collection handed to a coordinator; position is identity.
pub type WorkerPool<I, O> = Vec<Arc<dyn Worker<I, Output = O>>>;
