//! Notification endpoint derivation.
//!
//! The notification socket lives at a fixed path on the server's own host.
//! Given the base address a caller uses for the REST API, the URL keeps the
//! host and explicit port, forces `wss`, and replaces the path. The token is a
//! header, never a query parameter.

use std::fmt;

use url::Url;

use crate::errors::NotifyError;

/// Fixed path of the notification socket.
pub const NOTIFICATIONS_PATH: &str = "/:/websockets/notifications";

/// Header carrying the auth token.
pub const TOKEN_HEADER: &str = "X-Plex-Token";

/// Header carrying the optional client identifier.
pub const CLIENT_IDENTIFIER_HEADER: &str = "X-Plex-Client-Identifier";

/// Everything a [`crate::Connector`] needs to open the socket.
#[derive(Clone)]
pub struct DialRequest {
    /// Fully derived `wss://` URL.
    pub url: Url,
    /// Upgrade request headers, credential included.
    pub headers: Vec<(String, String)>,
}

impl DialRequest {
    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for DialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(n, v)| {
                if n.eq_ignore_ascii_case(TOKEN_HEADER) {
                    (n.as_str(), "<redacted>")
                } else {
                    (n.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("DialRequest")
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .finish()
    }
}

/// Derive the notification socket URL from a server base address.
pub fn notifications_url(base: &str) -> Result<Url, NotifyError> {
    let invalid = |reason: String| NotifyError::InvalidUrl {
        url: base.to_owned(),
        reason,
    };

    let parsed = Url::parse(base.trim()).map_err(|e| invalid(e.to_string()))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("address has no host".into()))?;

    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };
    Url::parse(&format!("wss://{authority}{NOTIFICATIONS_PATH}")).map_err(|e| invalid(e.to_string()))
}

/// Build the dial request for a server, token and optional client id.
pub fn dial_request(
    base: &str,
    token: &str,
    client_identifier: Option<&str>,
) -> Result<DialRequest, NotifyError> {
    let url = notifications_url(base)?;
    let mut headers = vec![(TOKEN_HEADER.to_owned(), token.to_owned())];
    if let Some(id) = client_identifier {
        headers.push((CLIENT_IDENTIFIER_HEADER.to_owned(), id.to_owned()));
    }
    Ok(DialRequest { url, headers })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn http_becomes_wss_with_fixed_path() {
        let url = notifications_url("http://192.168.1.20:32400").unwrap();
        assert_eq!(url.as_str(), "wss://192.168.1.20:32400/:/websockets/notifications");
    }

    #[test]
    fn path_query_and_fragment_are_replaced() {
        let url = notifications_url("https://plex.example.net:443/web/index.html?x=1#frag").unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("plex.example.net"));
        assert_eq!(url.path(), NOTIFICATIONS_PATH);
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn default_port_is_not_carried() {
        let url = notifications_url("http://plex.local").unwrap();
        assert_eq!(url.as_str(), "wss://plex.local/:/websockets/notifications");
    }

    #[test]
    fn ipv6_host_is_preserved() {
        let url = notifications_url("http://[::1]:32400").unwrap();
        assert_eq!(url.as_str(), "wss://[::1]:32400/:/websockets/notifications");
    }

    #[test]
    fn unparseable_address_is_rejected() {
        assert_matches!(
            notifications_url("not a url"),
            Err(NotifyError::InvalidUrl { url, .. }) if url == "not a url"
        );
    }

    #[test]
    fn address_without_host_is_rejected() {
        assert_matches!(
            notifications_url("mailto:someone@example.com"),
            Err(NotifyError::InvalidUrl { reason, .. }) if reason.contains("no host")
        );
    }

    #[test]
    fn token_travels_as_header() {
        let req = dial_request("http://h:32400", "s3cret", None).unwrap();
        assert_eq!(req.header("x-plex-token"), Some("s3cret"));
        assert!(req.url.query().is_none());
        assert!(req.header(CLIENT_IDENTIFIER_HEADER).is_none());
    }

    #[test]
    fn client_identifier_header_is_optional() {
        let req = dial_request("http://h:32400", "t", Some("plexwatch-1")).unwrap();
        assert_eq!(req.header(CLIENT_IDENTIFIER_HEADER), Some("plexwatch-1"));
    }

    #[test]
    fn debug_redacts_token() {
        let req = dial_request("http://h:32400", "s3cret", Some("cid")).unwrap();
        let debug = format!("{req:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("cid"));
    }
}
