//! CoordinatorBuilder - Coordinator の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - expect_capability() で使う予定の capability を宣言
//! - build() 時に全ワーカーがそれを持っているかチェック
//! - 不足があれば BuildError を返す（run を始める前に気付ける）

use std::sync::Arc;

use super::config::EngineConfig;
use super::coordinator::Coordinator;
use crate::domain::{Capability, WorkerId};
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator, WorkerPool};

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("workers {workers:?} do not provide capability={capability}")]
    MissingCapability {
        capability: Capability,
        workers: Vec<WorkerId>,
    },
}

/// Builder for [`Coordinator`].
///
/// # 使用例
/// ```ignore
/// let coordinator = Coordinator::builder(items, workers)
///     .config(EngineConfig::default().with_label("thumbnails"))
///     .expect_capability("resize")
///     .build()?;
/// ```
pub struct CoordinatorBuilder<I, O> {
    items: Vec<I>,
    workers: WorkerPool<I, O>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    expected: Vec<Capability>,
}

impl<I, O> CoordinatorBuilder<I, O>
where
    O: Send + 'static,
{
    pub fn new(items: Vec<I>, workers: WorkerPool<I, O>) -> Self {
        Self {
            items,
            workers,
            config: EngineConfig::default(),
            clock: Arc::new(SystemClock),
            ids: None,
            expected: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock for report timestamps and RunId timestamps.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// Declare a capability that every worker must provide.
    pub fn expect_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.expected.push(capability.into());
        self
    }

    /// Build, checking every expected capability against every worker.
    pub fn build(self) -> Result<Coordinator<I, O>, BuildError> {
        for capability in &self.expected {
            let workers: Vec<WorkerId> = self
                .workers
                .iter()
                .enumerate()
                .filter(|(_, w)| !w.provides(capability))
                .map(|(index, _)| WorkerId::new(index))
                .collect();
            if !workers.is_empty() {
                return Err(BuildError::MissingCapability {
                    capability: capability.clone(),
                    workers,
                });
            }
        }
        Ok(self.build_unchecked())
    }

    pub(crate) fn build_unchecked(self) -> Coordinator<I, O> {
        let ids = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(SharedClock(Arc::clone(&self.clock)))),
        };
        Coordinator {
            items: self.items,
            workers: self.workers,
            config: self.config,
            clock: self.clock,
            ids,
        }
    }
}

/// Lets the default id generator read the same clock as the reports.
struct SharedClock(Arc<dyn Clock>);

impl Clock for SharedClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.0.now()
    }
}
