//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so partial
//! JSON is accepted and missing fields get their default value.

mod server;
mod session;

pub use server::*;
pub use session::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "url": "https://plex.example.net:32400", "token": "abc" },
///   "session": { "heartbeatIntervalMs": 1000 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlexwatchSettings {
    /// Which server to connect to and how to authenticate.
    pub server: ServerSettings,
    /// Heartbeat and shutdown timing.
    pub session: SessionSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl PlexwatchSettings {
    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(SettingsError::InvalidValue("server url is empty".into()));
        }
        if self.session.heartbeat_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "heartbeatIntervalMs must be positive".into(),
            ));
        }
        if self.session.close_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "closeTimeoutMs must be positive".into(),
            ));
        }
        Ok(())
    }
}
