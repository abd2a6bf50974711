//! Errors - ワーカー側のエラー
//!
//! WorkError は capability 実行 1 回分の失敗を表す。
//! ConsumerLoop がこれを受け取ると、アイテムを再配送してそのループを終了する。

use thiserror::Error;

/// ErrorKind は失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The capability itself returned an error.
    Failed,
    /// The invocation did not finish within the configured timeout.
    TimedOut,
}

/// WorkError is the failure half of the worker capability contract.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct WorkError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl WorkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Failed,
            message: message.into(),
            source: None,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::TimedOut,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable via `source()`.
    pub fn from_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: ErrorKind::Failed,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
