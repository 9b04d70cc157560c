//! History display configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::HistoryError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Entries visible before any "show more".
    #[serde(default = "default_window")]
    pub initial_window: usize,

    /// Entries added per "show more".
    #[serde(default = "default_window")]
    pub increment: usize,

    /// Proposal text longer than this many characters is cut and suffixed
    /// with `...`.
    #[serde(default = "default_truncate_chars")]
    pub truncate_chars: usize,
}

fn default_window() -> usize {
    4
}

fn default_truncate_chars() -> usize {
    100
}

impl HistoryConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HistoryError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, HistoryError> {
        toml::to_string_pretty(self).map_err(|e| HistoryError::Config(e.to_string()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, HistoryError> {
        let config: Self = toml::from_str(s).map_err(|e| HistoryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HistoryError> {
        if self.initial_window == 0 || self.increment == 0 {
            return Err(HistoryError::Config(
                "history window sizes must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            initial_window: default_window(),
            increment: default_window(),
            truncate_chars: default_truncate_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_toml() {
        let config = HistoryConfig::from_toml_str("").unwrap();
        assert_eq!(config, HistoryConfig::default());
        assert_eq!(config.initial_window, 4);
        assert_eq!(config.truncate_chars, 100);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = HistoryConfig {
            initial_window: 10,
            increment: 5,
            truncate_chars: 60,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(HistoryConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn zero_increment_rejected() {
        assert!(HistoryConfig::from_toml_str("increment = 0").is_err());
    }
}
