use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;

use super::supply::{CryptoOverride, FetchCryptoKeys};
use super::{Keymaster, WriteOp};
use crate::crypto::{KeyIdToken, KeySet, TokenResolution};
use crate::error::{KeymasterError, KeymasterResult};
use crate::path::{ServerType, StoragePath};
use crate::sysmeta;

/// Whether keys ended up attached to a read response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProvision {
    Supplied,
    Withheld,
}

/// Per-request key state.
///
/// Starts with the keys of the request's own path. For object reads those are
/// replaced by the keys of the path recorded in the object's key id, which
/// differs from the request path when the object was copied.
#[derive(Debug)]
pub struct KeymasterContext {
    keymaster: Keymaster,
    target: StoragePath,
    keys: KeySet,
}

impl KeymasterContext {
    pub fn new(keymaster: Keymaster, target: StoragePath) -> Self {
        let keys = KeySet::for_path(keymaster.deriver(), &target);
        Self {
            keymaster,
            target,
            keys,
        }
    }

    pub fn target(&self) -> &StoragePath {
        &self.target
    }

    pub fn server_type(&self) -> ServerType {
        self.target.server_type()
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    pub fn fetch_crypto_keys(&self) -> FetchCryptoKeys {
        FetchCryptoKeys::new(self.keys.clone())
    }

    /// Prepare a PUT or POST before it is forwarded.
    ///
    /// Object PUTs get the key id of their own path stamped into persisted
    /// sysmeta, replacing any client value. Every write carries the keys of
    /// its own path.
    pub fn prepare_write(&self, op: WriteOp, req: &mut Request) -> KeymasterResult<()> {
        if op == WriteOp::Put {
            if let Some(obj_path) = self.target.object_path() {
                let token = KeyIdToken::encode(&obj_path);
                req.headers_mut()
                    .insert(sysmeta::crypto_id_header(), token.to_header_value()?);
                log::debug!("obj key id stamped: path={} token={}", obj_path, token);
            }
        }
        req.extensions_mut().insert(self.fetch_crypto_keys());
        Ok(())
    }

    /// Resolve keys for a GET or HEAD once the response is available.
    ///
    /// `overridden` is true when key supply was already suppressed upstream.
    /// Keys are never attached to an overridden response.
    pub fn provide_keys_get_or_head(
        &mut self,
        req_path: &str,
        mut overridden: bool,
        resp: &mut Response,
    ) -> KeymasterResult<KeyProvision> {
        if self.server_type() == ServerType::Object {
            let stored = resp.headers().get(sysmeta::CRYPTO_ID_HEADER);
            match KeyIdToken::resolve(stored) {
                TokenResolution::Resolved(key_path) => {
                    self.keys = KeySet::for_path(self.keymaster.deriver(), &key_path);
                    log::debug!("obj key id: {}", key_path);
                    if let Some(cont_path) = key_path.container_path() {
                        log::debug!("cont key id: {}", cont_path);
                    }
                    if key_path != self.target {
                        log::debug!(
                            "key id differs from request target: target={} key_id={}",
                            self.target,
                            key_path
                        );
                    }
                }
                TokenResolution::Malformed(reason) => {
                    log::warn!("key id unusable for path {}: {}", req_path, reason);
                    overridden = true;
                    if self.keymaster.enforces_key_requirement() {
                        self.error_if_need_keys(req_path, resp.headers())?;
                    }
                }
            }
        }

        if overridden {
            resp.extensions_mut().insert(CryptoOverride);
            return Ok(KeyProvision::Withheld);
        }

        resp.extensions_mut().insert(self.fetch_crypto_keys());
        Ok(KeyProvision::Supplied)
    }

    /// Fail when the response carries encryption metadata for this target,
    /// since no keys will be supplied to decrypt it.
    pub fn error_if_need_keys(&self, req_path: &str, headers: &HeaderMap) -> KeymasterResult<()> {
        if sysmeta::has_crypto_meta(self.server_type(), headers) {
            log::error!("Cannot get necessary keys for path {}", req_path);
            return Err(KeymasterError::MissingKeys(req_path.to_string()));
        }
        log::debug!("No encryption keys necessary for path {}", req_path);
        Ok(())
    }
}
