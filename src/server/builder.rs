//! Fluent construction of a [`Server`].
//!
//! The builder starts from a [`ServerConfig`] and production defaults (a
//! [`TokioEngine`] bound to the current runtime and the
//! [`DefaultAccessPolicy`]). Either can be overridden before `build()`.
//!
//! ## Example
//! ```ignore
//! let server = ServerBuilder::new(ServerConfig::new()?.validate()?)
//!     .access_policy(Box::new(MyPolicy))
//!     .build()?;
//! ```
//!
//! `build()` is the only place a server can fail for good: without a usable
//! engine it returns [`Error::EngineUnavailable`] and no server exists.

use std::sync::Arc;

use tracing::error;
use tracing::info;

use crate::AccessPolicy;
use crate::DefaultAccessPolicy;
use crate::Error;
use crate::ProtocolEngine;
use crate::Result;
use crate::Server;
use crate::ServerConfig;
use crate::TokioEngine;

pub struct ServerBuilder {
    config: ServerConfig,
    engine: Option<Arc<dyn ProtocolEngine>>,
    access_policy: Option<Box<dyn AccessPolicy>>,
}

impl ServerBuilder {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            engine: None,
            access_policy: None,
        }
    }

    /// Loads configuration from defaults, `CONFIG_PATH` and `UA__` variables,
    /// applying `override_path` on top when given.
    pub fn from_env(override_path: Option<&str>) -> Result<Self> {
        let mut config = ServerConfig::new()?;
        if let Some(path) = override_path {
            info!("with_override_config from: {}", path);
            config = config.with_override_config(path)?;
        }
        Ok(Self::new(config.validate()?))
    }

    pub fn engine(
        mut self,
        engine: Arc<dyn ProtocolEngine>,
    ) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn access_policy(
        mut self,
        access_policy: Box<dyn AccessPolicy>,
    ) -> Self {
        self.access_policy = Some(access_policy);
        self
    }

    pub fn build(self) -> Result<Arc<Server>> {
        let config = self.config.validate().map_err(|e| {
            error!("invalid server configuration: {}", e);
            e
        })?;

        let engine = match self.engine {
            Some(engine) => engine,
            None => Arc::new(TokioEngine::new().map_err(|e| {
                error!("protocol engine unavailable: {}", e);
                match e {
                    Error::EngineUnavailable(_) => e,
                    other => Error::EngineUnavailable(other.to_string()),
                }
            })?),
        };

        let access_policy = self
            .access_policy
            .unwrap_or_else(|| Box::new(DefaultAccessPolicy::new(&config.access)));

        let server = Server::new(config, engine, access_policy);
        info!(
            application_uri = %server.config().server.application_uri,
            "server constructed"
        );
        Ok(server)
    }
}
