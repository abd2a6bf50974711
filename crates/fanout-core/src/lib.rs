//! fanout-core
//!
//! Bounded work distribution: a fixed set of items is spread over a pool of
//! async workers, each item is processed exactly once, and a worker that
//! fails on an item retires while the item goes back to the survivors.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, invocation, outcome, errors）
//! - **ports**: 抽象化レイヤー（Worker, Clock, IdGenerator）
//! - **queue**: WorkQueue（FIFO + completion ledger）と Lease
//! - **app**: Coordinator, ConsumerLoop, aggregator, builder, config, report
//! - **observability**: キューの状態ビュー
//! - **error**: run レベルのエラー

pub mod app;
pub mod domain;
pub mod error;
pub mod observability;
pub mod ports;
pub mod queue;

pub use app::{Coordinator, CoordinatorBuilder, EngineConfig, RunReport};
pub use domain::{Capability, Invocation, LoopOutcome, WorkError, WorkerId};
pub use error::{EngineError, QueueError};
pub use ports::{Worker, WorkerPool};
