//! Ports - 抽象化レイヤー
//!
//! エンジンが外側に求めるものだけを trait にしている。
//! - Worker: アイテムを処理する呼び出し側のオブジェクト
//! - Clock / IdGenerator: 時刻と RunId（テストで差し替え可能）

pub mod clock;
pub mod id_generator;
pub mod worker;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::worker::{Worker, WorkerPool};
