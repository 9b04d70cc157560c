//! Client configuration, loaded from TOML and overridden by flags.

use aim_history::HistoryConfig;
use aim_synchronizer::SyncConfig;
use aim_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC relay in front of the evaluator contract.
    #[serde(default = "default_node_url")]
    pub node_url: String,

    /// Event stream for `ProposalSubmitted` / `ProposalEvaluated`.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_node_url() -> String {
    "http://127.0.0.1:8545".into()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:8546".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl ClientConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_url.is_empty() {
            return Err(ConfigError::Invalid("node_url must not be empty".into()));
        }
        if self.ws_url.is_empty() {
            return Err(ConfigError::Invalid("ws_url must not be empty".into()));
        }
        self.sync
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.history
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            ws_url: default_ws_url(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            sync: SyncConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(ClientConfig::from_toml_str("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn default_round_trips() {
        let config = ClientConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn nested_sections_override() {
        let toml = r#"
            node_url = "http://relay.example:8545"
            log_format = "json"

            [sync]
            poll_interval_ms = 2000
            max_poll_attempts = 60

            [history]
            initial_window = 10
        "#;
        let config = ClientConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.node_url, "http://relay.example:8545");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.sync.poll_interval_ms, 2000);
        assert_eq!(config.sync.max_poll_attempts, Some(60));
        assert_eq!(config.history.initial_window, 10);
        assert_eq!(config.history.increment, 4);
    }

    #[test]
    fn invalid_nested_values_rejected() {
        let err = ClientConfig::from_toml_str("[sync]\npoll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ws_url = \"ws://events.example\"").unwrap();
        let config = ClientConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.ws_url, "ws://events.example");
    }
}
