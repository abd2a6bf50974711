//! FailureAggregator - 全ループの終了状態から run の成否を判定
//!
//! 一部のワーカーの失敗は許容する。全ループが Failed で終わったときだけ
//! AllWorkersFailed を返す。

use crate::domain::LoopOutcome;
use crate::error::EngineError;

/// Verdict over every loop's terminal outcome.
///
/// Pure: the same outcomes always give the same verdict. An empty set never
/// fails (there was nobody to fail).
pub fn check_all(outcomes: &[LoopOutcome]) -> Result<(), EngineError> {
    if outcomes.is_empty() || !outcomes.iter().all(LoopOutcome::is_failed) {
        return Ok(());
    }

    Err(EngineError::AllWorkersFailed {
        workers: outcomes.len(),
        completed: outcomes.iter().map(LoopOutcome::processed).sum(),
    })
}
