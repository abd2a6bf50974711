//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-run knobs.
///
/// Every field has a default, so a partial JSON/TOML document is enough:
/// ```ignore
/// let cfg: EngineConfig = serde_json::from_str(r#"{ "invocation_timeout_ms": 500 }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recorded on the run span and in the report.
    pub label: String,

    /// Upper bound for one capability invocation. A timeout counts as a
    /// per-item failure. `None` leaves the bound to the worker.
    pub invocation_timeout_ms: Option<u64>,
}

impl EngineConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label: "fanout".to_string(),
            invocation_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_timeout() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.label, "fanout");
        assert_eq!(cfg.invocation_timeout(), None);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "invocation_timeout_ms": 250 }"#).unwrap();
        assert_eq!(cfg.label, "fanout");
        assert_eq!(cfg.invocation_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn builders_override() {
        let cfg = EngineConfig::default()
            .with_label("nightly")
            .with_invocation_timeout(Duration::from_secs(2));
        assert_eq!(cfg.label, "nightly");
        assert_eq!(cfg.invocation_timeout_ms, Some(2000));
    }

    #[test]
    fn huge_timeout_saturates() {
        let cfg = EngineConfig::default().with_invocation_timeout(Duration::MAX);
        assert_eq!(cfg.invocation_timeout_ms, Some(u64::MAX));
    }
}
