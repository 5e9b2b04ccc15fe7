//! Client configuration

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Drop store writes from a refresh older than one already applied.
    ///
    /// Off by default: concurrent refreshes resolve last-write-wins per key.
    #[serde(default)]
    pub sequence_guard: bool,

    /// Capacity of the provider event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Run a full refresh after a successful `connect()`
    #[serde(default = "default_true")]
    pub refresh_on_connect: bool,
}

fn default_event_buffer() -> usize {
    32
}

fn default_true() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sequence_guard: false,
            event_buffer: default_event_buffer(),
            refresh_on_connect: true,
        }
    }
}

impl ClientConfig {
    /// Defaults plus the refresh sequence guard
    pub fn hardened() -> Self {
        Self {
            sequence_guard: true,
            ..Self::default()
        }
    }

    /// Parse from JSON, filling unset fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SyncError::Config(format!("invalid client config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_buffer == 0 {
            return Err(SyncError::Config("event_buffer must be at least 1".into()));
        }
        Ok(())
    }
}
