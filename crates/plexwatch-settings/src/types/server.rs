//! Server address and credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which Plex Media Server to connect to.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Base address of the server (`http(s)://host:port`). Only the host and
    /// port are used; the notification URL is derived from it.
    pub url: String,
    /// Plex auth token, sent as the `X-Plex-Token` header.
    pub token: String,
    /// Optional client identifier, sent as `X-Plex-Client-Identifier`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_identifier: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:32400".to_string(),
            token: String::new(),
            client_identifier: None,
        }
    }
}

// The token never goes to logs.
impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("url", &self.url)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("client_identifier", &self.client_identifier)
            .finish()
    }
}
