use std::sync::Arc;

use crate::crypto::KeySet;

/// Key-supply handle passed to the service that encrypts or decrypts payloads.
///
/// Write requests carry it in the request extensions, so the inner service
/// sees it before it stores the body. Reads carry it in the response
/// extensions once the key id has been resolved. It is absent whenever keys
/// are withheld.
#[derive(Debug, Clone)]
pub struct FetchCryptoKeys {
    keys: Arc<KeySet>,
}

impl FetchCryptoKeys {
    pub fn new(keys: KeySet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn fetch(&self) -> KeySet {
        (*self.keys).clone()
    }
}

/// Marks a request whose keys are withheld.
///
/// An outer layer may set it on the request to suppress key supply. The
/// keymaster sets it on the response when it withholds keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CryptoOverride;
