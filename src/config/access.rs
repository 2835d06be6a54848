use serde::Deserialize;
use serde::Serialize;

/// Switches of the default access policy. Local callers are never
/// restricted; these only apply to remote sessions.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccessConfig {
    /// Default: false
    #[serde(default)]
    pub allow_remote_delete: bool,

    /// Default: true
    #[serde(default = "enabled")]
    pub allow_remote_add: bool,

    /// Default: true
    #[serde(default = "enabled")]
    pub allow_remote_write: bool,
}

fn enabled() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allow_remote_delete: false,
            allow_remote_add: true,
            allow_remote_write: true,
        }
    }
}
