//! App - エンジン本体
//!
//! # 主要コンポーネント
//! - **Coordinator**: アイテム投入、ループ起動、キャンセル、drain 待ち
//! - **ConsumerLoop**: ワーカーごとの dequeue → invoke → ack/redeliver ループ
//! - **aggregator**: 全ループ失敗の判定
//! - **CoordinatorBuilder / EngineConfig**: 構築と設定
//! - **RunReport**: run の結果と履歴

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod consumer_loop;
pub mod coordinator;
pub mod report;
mod run;

pub use self::builder::{BuildError, CoordinatorBuilder};
pub use self::config::EngineConfig;
pub use self::consumer_loop::ConsumerLoop;
pub use self::coordinator::Coordinator;
pub use self::report::RunReport;
