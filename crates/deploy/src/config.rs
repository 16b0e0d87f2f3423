//! Deploy configuration.
//!
//! Stored as TOML, e.g.:
//!
//! ```toml
//! event_buffer = 128
//!
//! [auth]
//! site_id = "app.example.com"
//! provider = "github"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sitedrop_protocol::AuthOptions;

use crate::error::DeployError;

/// Default capacity of the deploy event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Deploy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Options for the login handshake.
    #[serde(default)]
    pub auth: AuthOptions,

    /// Capacity of the event channel feeding the presentation sink.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            auth: AuthOptions::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl DeployConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, DeployError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        if !path.exists() {
            return Err(DeployError::NotFound(format!(
                "config file: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
