//! Synchronizer configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::SyncError;

/// Polling and channel parameters for the [`Synchronizer`].
///
/// [`Synchronizer`]: crate::Synchronizer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed delay between result reads, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up after this many timer-driven reads. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,

    /// Capacity of the command channel feeding the event loop.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Capacity of the poll outcome channel.
    #[serde(default = "default_outcome_buffer")]
    pub outcome_buffer: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_command_buffer() -> usize {
    32
}

fn default_outcome_buffer() -> usize {
    16
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SyncError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SyncError> {
        let config: Self = toml::from_str(s).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SyncError> {
        toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.poll_interval_ms == 0 {
            return Err(SyncError::Config("poll_interval_ms must be positive".into()));
        }
        if self.max_poll_attempts == Some(0) {
            return Err(SyncError::Config("max_poll_attempts must be positive".into()));
        }
        if self.command_buffer == 0 || self.outcome_buffer == 0 {
            return Err(SyncError::Config("channel buffers must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: None,
            command_buffer: default_command_buffer(),
            outcome_buffer: default_outcome_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SyncConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = SyncConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = SyncConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.max_poll_attempts, None);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            poll_interval_ms = 250
            max_poll_attempts = 40
        "#;
        let config = SyncConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.max_poll_attempts, Some(40));
        assert_eq!(config.command_buffer, 32);
    }

    #[test]
    fn zero_interval_rejected() {
        let err = SyncConfig::from_toml_str("poll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        assert!(SyncConfig::from_toml_str("max_poll_attempts = 0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_ms = 1000").unwrap();
        let config = SyncConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = SyncConfig::from_toml_file("/nonexistent/aim.toml");
        assert!(matches!(result, Err(SyncError::Config(_))));
    }
}
