//! Configuration management for the address space server.
//!
//! Settings are layered: code defaults first, then an optional file, then
//! `UA__` environment variables. Each section validates itself.
mod access;
mod address_space;
mod callbacks;
mod server;
pub use access::*;
pub use address_space::*;
pub use callbacks::*;
pub use server::*;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the address space server
///
/// Later layers win: defaults, the file named by `CONFIG_PATH`, then `UA__`
/// environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ServerConfig {
    /// Application identity and host loop timing
    #[serde(default)]
    pub server: ServerSettings,
    /// Node id assignment and store limits
    #[serde(default)]
    pub address_space: AddressSpaceConfig,
    /// Repeated callback intervals
    #[serde(default)]
    pub callbacks: CallbackConfig,
    /// Default access policy switches for remote sessions
    #[serde(default)]
    pub access: AccessConfig,
}

impl ServerConfig {
    /// Merges every layer into one unvalidated config. Run `validate()`
    /// before building a server from it.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("UA__CALLBACKS__MIN_INTERVAL_MS", "10");
    /// let cfg = ServerConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("UA")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from a file without validation.
    ///
    /// Merging order: current values, the new file, then the latest
    /// environment variables.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("UA")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.server.validate()?;
        self.address_space.validate()?;
        self.callbacks.validate()?;
        Ok(self)
    }
}
