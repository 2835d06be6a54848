use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Repeated callback timing
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CallbackConfig {
    /// Interval used when a callback is registered without one
    ///
    /// Default: 1000
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,

    /// Smallest interval `start` and `change_interval` accept
    ///
    /// Default: 5
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_min_interval_ms() -> u64 {
    5
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: default_interval_ms(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl CallbackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "callbacks.min_interval_ms must be greater than 0".into(),
            )));
        }
        if self.default_interval_ms < self.min_interval_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "callbacks.default_interval_ms ({}) must not be below min_interval_ms ({})",
                self.default_interval_ms, self.min_interval_ms
            ))));
        }
        Ok(())
    }
}
