//! ConsumerLoop - 1 ワーカーにつき 1 つの実行ループ
//!
//! # フロー
//! 1. 全アイテムの結果が揃っていたら、run 全体の CancellationToken を cancel
//! 2. dequeue（空なら待つ。cancel と競合させる）
//! 3. capability を実行
//!    - 成功: 結果を追加して ack、1 に戻る
//!    - 失敗: アイテムを再配送してループ終了（以後このワーカーは何もしない）

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::run::RunContext;
use crate::domain::{LoopOutcome, LoopState, WorkError, WorkerId};
use crate::error::EngineError;
use crate::ports::Worker;

pub struct ConsumerLoop<I, O> {
    worker_id: WorkerId,
    worker: Arc<dyn Worker<I, Output = O>>,
    run: Arc<RunContext<I, O>>,
    state: LoopState,
    processed: usize,
}

impl<I, O> ConsumerLoop<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    pub(crate) fn new(
        worker_id: WorkerId,
        worker: Arc<dyn Worker<I, Output = O>>,
        run: Arc<RunContext<I, O>>,
    ) -> Self {
        Self {
            worker_id,
            worker,
            run,
            state: LoopState::Running,
            processed: 0,
        }
    }

    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Drive the loop until cancellation or the first failure.
    ///
    /// An `Err` here means the queue ledger was misused, not that the worker
    /// failed; worker failures come back as `LoopOutcome::Failed`.
    pub async fn run(mut self) -> Result<LoopOutcome, EngineError> {
        let run = Arc::clone(&self.run);

        loop {
            if run.is_complete().await {
                debug!(worker = %self.worker_id, "all items accounted for, cancelling run");
                run.cancel.cancel();
            }

            // biased: once cancelled, never take another item
            let lease = tokio::select! {
                biased;
                _ = run.cancel.cancelled() => None,
                lease = run.queue.dequeue() => Some(lease),
            };
            let Some(lease) = lease else {
                return Ok(self.exit(None));
            };

            debug!(worker = %self.worker_id, "dequeued item");

            match self.invoke(lease.item()).await {
                Ok(output) => {
                    let recorded = run.record(output).await;
                    lease.ack()?;
                    self.processed += 1;
                    debug!(
                        worker = %self.worker_id,
                        recorded,
                        expected = run.expected(),
                        "item completed"
                    );
                }
                Err(err) => {
                    warn!(worker = %self.worker_id, error = %err, "worker failed on item, redelivering and retiring");
                    lease.redeliver().await?;
                    return Ok(self.exit(Some(err.to_string())));
                }
            }
        }
    }

    async fn invoke(&self, item: &I) -> Result<O, WorkError> {
        let call = self.worker.invoke(item, &self.run.invocation);
        match self.run.invocation_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                WorkError::timed_out(format!("invocation exceeded {}ms", limit.as_millis()))
            })?,
            None => call.await,
        }
    }

    fn exit(&mut self, error: Option<String>) -> LoopOutcome {
        self.state = LoopState::Exited;
        let (worker, processed) = (self.worker_id, self.processed);
        info!(%worker, processed, failed = error.is_some(), "consumer loop exited");
        match error {
            Some(error) => LoopOutcome::Failed {
                worker,
                processed,
                error,
            },
            None => LoopOutcome::Stopped { worker, processed },
        }
    }
}
