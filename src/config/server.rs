use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Identity of the application and timing of the host loop
///
/// ```toml
/// [server]
/// application_uri = "urn:ua-space:server"
/// application_name = "ua-space"
/// process_interval_ms = 100
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerSettings {
    /// Registered as namespace 1
    #[serde(default = "default_application_uri")]
    pub application_uri: String,

    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Period of the host loop's `process()` tick in milliseconds
    ///
    /// Default: 100
    #[serde(default = "default_process_interval_ms")]
    pub process_interval_ms: u64,
}

fn default_application_uri() -> String {
    "urn:ua-space:server".to_string()
}

fn default_application_name() -> String {
    "ua-space".to_string()
}

fn default_process_interval_ms() -> u64 {
    100
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            application_uri: default_application_uri(),
            application_name: default_application_name(),
            process_interval_ms: default_process_interval_ms(),
        }
    }
}

impl ServerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.application_uri.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "server.application_uri must not be empty".into(),
            )));
        }
        if self.process_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "server.process_interval_ms must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}
