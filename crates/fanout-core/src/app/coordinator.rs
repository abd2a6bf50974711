//! Coordinator - アイテムの投入、ループの起動、結果の集約
//!
//! # フロー
//! 1. capability を全ワーカーが持っているか検証
//! 2. 全アイテムを WorkQueue に投入（ledger = アイテム数）
//! 3. ワーカーごとに ConsumerLoop を tokio task として起動
//! 4. 全ループを join して LoopOutcome を集める（panic したら即 cancel して返す）
//! 5. FailureAggregator で判定（全滅ならここで返す）
//! 6. ledger が 0 になるのを待って結果を返す

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

use super::aggregator;
use super::builder::CoordinatorBuilder;
use super::config::EngineConfig;
use super::consumer_loop::ConsumerLoop;
use super::report::RunReport;
use super::run::RunContext;
use crate::domain::{Invocation, LoopOutcome, WorkerId};
use crate::error::EngineError;
use crate::ports::{Clock, IdGenerator, WorkerPool};

/// Distributes a fixed set of items over a pool of workers.
///
/// The coordinator itself holds no run state: every `perform` builds a fresh
/// queue, result collection and cancellation token, so it can be called
/// more than once.
pub struct Coordinator<I, O> {
    pub(crate) items: Vec<I>,
    pub(crate) workers: WorkerPool<I, O>,
    pub(crate) config: EngineConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl<I, O> Coordinator<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    /// Coordinator with the default config and the system clock.
    pub fn new(items: Vec<I>, workers: WorkerPool<I, O>) -> Self {
        Self::builder(items, workers).build_unchecked()
    }

    pub fn builder(items: Vec<I>, workers: WorkerPool<I, O>) -> CoordinatorBuilder<I, O> {
        CoordinatorBuilder::new(items, workers)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Process every item once and return the outputs in completion order.
    pub async fn perform(&self, invocation: Invocation) -> Result<Vec<O>, EngineError> {
        self.perform_with_report(invocation)
            .await
            .map(|report| report.results)
    }

    /// Same as [`Coordinator::perform`], keeping per-loop outcomes and timing.
    pub async fn perform_with_report(
        &self,
        invocation: Invocation,
    ) -> Result<RunReport<O>, EngineError> {
        let run_id = self.ids.generate_run_id();
        let span = info_span!(
            "run",
            %run_id,
            label = %self.config.label,
            capability = %invocation.capability(),
            items = self.items.len(),
            workers = self.workers.len()
        );

        async move {
            let started_at = self.clock.now();
            self.validate(&invocation)?;

            let expected = self.items.len();
            let run = Arc::new(RunContext::new(
                expected,
                invocation,
                self.config.invocation_timeout(),
            ));
            // stop idle loops if we leave early (error or caller dropping us)
            let _cancel_on_exit = run.cancel.clone().drop_guard();

            run.queue.enqueue_all(self.items.iter().cloned()).await;

            let loops = self.spawn_loops(&run);
            let outcomes = join_loops(loops, &run.cancel).await?;

            aggregator::check_all(&outcomes).inspect_err(|err| error!(error = %err, "run failed"))?;

            run.queue.await_drained().await;

            let results = run.take_results().await;
            if results.len() != expected {
                return Err(EngineError::Incomplete {
                    expected,
                    recorded: results.len(),
                });
            }

            let redelivered = run.queue.redelivered();
            info!(results = results.len(), redelivered, "run completed");

            Ok(RunReport {
                run_id,
                label: self.config.label.clone(),
                results,
                outcomes,
                redelivered,
                started_at,
                finished_at: self.clock.now(),
            })
        }
        .instrument(span)
        .await
    }

    fn validate(&self, invocation: &Invocation) -> Result<(), EngineError> {
        if self.workers.is_empty() && !self.items.is_empty() {
            return Err(EngineError::NoWorkers {
                items: self.items.len(),
            });
        }

        let capability = invocation.capability();
        for (index, worker) in self.workers.iter().enumerate() {
            if !worker.provides(capability) {
                return Err(EngineError::CapabilityNotFound {
                    worker: WorkerId::new(index),
                    capability: capability.clone(),
                });
            }
        }
        Ok(())
    }

    fn spawn_loops(&self, run: &Arc<RunContext<I, O>>) -> LoopSet {
        let mut set = LoopSet {
            tasks: JoinSet::new(),
            workers: HashMap::with_capacity(self.workers.len()),
        };
        for (index, worker) in self.workers.iter().enumerate() {
            let worker_id = WorkerId::new(index);
            let consumer = ConsumerLoop::new(worker_id, Arc::clone(worker), Arc::clone(run));
            let span = info_span!("consumer", worker = %worker_id);
            let handle = set.tasks.spawn(consumer.run().instrument(span));
            set.workers.insert(handle.id(), worker_id);
        }
        set
    }
}

/// Running consumer loops, keyed back to the worker that owns each task.
struct LoopSet {
    tasks: JoinSet<Result<LoopOutcome, EngineError>>,
    workers: HashMap<task::Id, WorkerId>,
}

/// Wait for every loop, in whatever order they finish.
///
/// A loop task that was cancelled ended benignly. The first panic cancels
/// the run and returns at once; dropping the set aborts the other loops.
async fn join_loops(
    mut set: LoopSet,
    cancel: &CancellationToken,
) -> Result<Vec<LoopOutcome>, EngineError> {
    let mut outcomes: Vec<Option<LoopOutcome>> = vec![None; set.workers.len()];
    while let Some(joined) = set.tasks.join_next_with_id().await {
        match joined {
            Ok((_, outcome)) => {
                let outcome = outcome?;
                let index = outcome.worker().index();
                outcomes[index] = Some(outcome);
            }
            Err(err) => {
                let Some(&worker) = set.workers.get(&err.id()) else {
                    continue;
                };
                if err.is_cancelled() {
                    outcomes[worker.index()] = Some(LoopOutcome::Stopped {
                        worker,
                        processed: 0,
                    });
                    continue;
                }
                error!(%worker, "consumer loop panicked");
                cancel.cancel();
                return Err(EngineError::LoopPanicked { worker });
            }
        }
    }
    Ok(outcomes.into_iter().flatten().collect())
}
