use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Node id assignment and store limits
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AddressSpaceConfig {
    /// First numeric identifier handed out for auto-assigned node ids
    ///
    /// Default: 50000
    #[serde(default = "default_first_auto_id")]
    pub first_auto_id: u32,

    /// Upper bound on the number of nodes, namespace 0 included. 0 means
    /// unlimited.
    #[serde(default)]
    pub max_nodes: usize,
}

fn default_first_auto_id() -> u32 {
    50000
}

impl Default for AddressSpaceConfig {
    fn default() -> Self {
        Self {
            first_auto_id: default_first_auto_id(),
            max_nodes: 0,
        }
    }
}

impl AddressSpaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.first_auto_id == 0 {
            return Err(Error::Config(ConfigError::Message(
                "address_space.first_auto_id must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}
