use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::path::StoragePath;

type HmacSha256 = Hmac<Sha256>;

pub const KEY_LEN: usize = 32;

/// 256-bit symmetric key for one container or object path.
#[derive(Clone, Copy)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// First 8 bytes of SHA-256 over the key, hex encoded. Safe to log.
    pub fn fingerprint(&self) -> String {
        Sha256::digest(self.0)[..8]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey({})", self.fingerprint())
    }
}

/// Derives per-path keys from a single root secret:
///
/// ```text
/// <path_key> = HMAC_SHA256(<root_key>, <path>)
/// ```
///
/// This is the only place keys are computed.
#[derive(Clone)]
pub struct KeyDeriver {
    root_key: Arc<[u8]>,
}

impl KeyDeriver {
    pub fn new(root_key: impl AsRef<[u8]>) -> Self {
        Self {
            root_key: Arc::from(root_key.as_ref()),
        }
    }

    pub fn derive(&self, key_path: &str) -> DerivedKey {
        let mut mac =
            HmacSha256::new_from_slice(&self.root_key).expect("HMAC accepts keys of any length");
        mac.update(key_path.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&mac.finalize().into_bytes());
        DerivedKey(key)
    }
}

impl fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDeriver")
            .field("root_key", &"<redacted>")
            .finish()
    }
}

/// Which level of the hierarchy a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    Container,
    Object,
}

impl KeyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyScope::Container => "container",
            KeyScope::Object => "object",
        }
    }
}

/// Container and object keys for one target.
///
/// Holds a container key for container- and object-level targets and an
/// object key for object-level targets only. Account-level targets get an
/// empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    container: Option<DerivedKey>,
    object: Option<DerivedKey>,
}

impl KeySet {
    pub fn for_path(deriver: &KeyDeriver, path: &StoragePath) -> Self {
        Self {
            container: path.container_path().map(|p| deriver.derive(&p)),
            object: path.object_path().map(|p| deriver.derive(&p)),
        }
    }

    pub fn container(&self) -> Option<&DerivedKey> {
        self.container.as_ref()
    }

    pub fn object(&self) -> Option<&DerivedKey> {
        self.object.as_ref()
    }

    /// Look up a key by its name, `"container"` or `"object"`.
    pub fn get(&self, name: &str) -> Option<&DerivedKey> {
        match name {
            "container" => self.container(),
            "object" => self.object(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyScope, &DerivedKey)> {
        self.container
            .iter()
            .map(|k| (KeyScope::Container, k))
            .chain(self.object.iter().map(|k| (KeyScope::Object, k)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_none() && self.object.is_none()
    }
}
