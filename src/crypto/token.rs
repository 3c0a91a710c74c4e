use std::fmt;

use axum::http::HeaderValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::KeymasterResult;
use crate::path::StoragePath;

/// Base64 record of the path an object's keys were derived from.
///
/// Written as object sysmeta on PUT so a copied object still resolves to the
/// keys of its original path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIdToken(String);

impl KeyIdToken {
    /// Encode a full object path (`/<account>/<container>/<object>`).
    pub fn encode(object_path: &str) -> Self {
        Self(STANDARD.encode(object_path.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_header_value(&self) -> KeymasterResult<HeaderValue> {
        Ok(HeaderValue::from_str(&self.0)?)
    }

    /// Decode a stored token into the object path it records.
    pub fn resolve(value: Option<&HeaderValue>) -> TokenResolution {
        let raw = match value.map(|v| v.to_str()) {
            None => return TokenResolution::Malformed(MalformedToken::Missing),
            Some(Err(_)) => return TokenResolution::Malformed(MalformedToken::NotAscii),
            Some(Ok(raw)) if raw.is_empty() => {
                return TokenResolution::Malformed(MalformedToken::Missing)
            }
            Some(Ok(raw)) => raw,
        };

        let decoded = match STANDARD.decode(raw) {
            Ok(bytes) => bytes,
            Err(_) => return TokenResolution::Malformed(MalformedToken::NotBase64(raw.into())),
        };

        let key_path = match String::from_utf8(decoded) {
            Ok(path) => path,
            Err(_) => return TokenResolution::Malformed(MalformedToken::NotUtf8(raw.into())),
        };

        match StoragePath::from_object_path(&key_path) {
            Some(path) => TokenResolution::Resolved(path),
            None => TokenResolution::Malformed(MalformedToken::WrongShape(key_path)),
        }
    }
}

impl fmt::Display for KeyIdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of reading a key id token back from object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResolution {
    /// The token names an object path; keys come from it.
    Resolved(StoragePath),
    /// No usable token; keys must be withheld.
    Malformed(MalformedToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedToken {
    Missing,
    NotAscii,
    NotBase64(String),
    NotUtf8(String),
    /// Decoded, but not exactly account/container/object.
    WrongShape(String),
}

impl fmt::Display for MalformedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedToken::Missing => f.write_str("no object key id was found"),
            MalformedToken::NotAscii => f.write_str("key id header is not visible ascii"),
            MalformedToken::NotBase64(raw) => write!(f, "path {} could not be decoded", raw),
            MalformedToken::NotUtf8(raw) => write!(f, "path {} is not utf-8", raw),
            MalformedToken::WrongShape(path) => write!(f, "invalid key id path {}", path),
        }
    }
}
