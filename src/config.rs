//! Runtime configuration for stores and states.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of buffered change events per channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("event_capacity must be greater than zero")]
    ZeroCapacity,
}

/// Tunables shared by [`GlobalVariableManager`](crate::variables::GlobalVariableManager)
/// and the state types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of each broadcast channel. Slow subscribers that fall
    /// further behind than this observe a lag instead of blocking writers.
    pub event_capacity: usize,

    /// Include variable values in debug logs.
    pub log_values: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_values: false,
        }
    }
}

impl RuntimeConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Capacity usable for a broadcast channel, which panics on zero.
    pub(crate) fn channel_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn fields_are_read() {
        let config = RuntimeConfig::from_json(r#"{"event_capacity": 8, "log_values": true}"#).unwrap();
        assert_eq!(config.event_capacity, 8);
        assert!(config.log_values);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result = RuntimeConfig::from_json(r#"{"event_capacity": 0}"#);
        assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            RuntimeConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
