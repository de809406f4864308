//! Lenient field deserializers for server quirks.

use serde::{Deserialize, Deserializer};

/// Integer the server may encode as either a JSON number or a numeric string
/// (`"itemID": "1234"`). Empty strings and `null` decode as `None`.
pub(crate) fn opt_i64_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected integer, got {s:?}"))),
    }
}
