pub mod context;
pub mod middleware;
pub mod supply;

use axum::http::Method;

use crate::config::KeymasterConfig;
use crate::crypto::KeyDeriver;
use crate::path::StoragePath;

pub use context::{KeyProvision, KeymasterContext};
pub use middleware::keymaster_middleware;
pub use supply::{CryptoOverride, FetchCryptoKeys};

/// Shared keymaster state. Cheap to clone; the root key sits behind an `Arc`
/// and is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Keymaster {
    deriver: KeyDeriver,
    enforce_key_requirement: bool,
}

impl Keymaster {
    pub fn new(root_key: impl AsRef<[u8]>) -> Self {
        Self {
            deriver: KeyDeriver::new(root_key),
            enforce_key_requirement: true,
        }
    }

    pub fn from_config(config: &KeymasterConfig) -> Self {
        Self::new(config.root_secret.as_bytes())
            .with_key_requirement(config.enforce_key_requirement)
    }

    /// Reject reads whose response needs keys that could not be resolved.
    pub fn with_key_requirement(mut self, enforce: bool) -> Self {
        self.enforce_key_requirement = enforce;
        self
    }

    pub fn deriver(&self) -> &KeyDeriver {
        &self.deriver
    }

    pub fn enforces_key_requirement(&self) -> bool {
        self.enforce_key_requirement
    }

    pub fn context_for(&self, target: StoragePath) -> KeymasterContext {
        KeymasterContext::new(self.clone(), target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Put,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOp {
    Get,
    Head,
}

/// What the keymaster does for a request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Write(WriteOp),
    Read(ReadOp),
    PassThrough,
}

impl Operation {
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::PUT => Operation::Write(WriteOp::Put),
            Method::POST => Operation::Write(WriteOp::Post),
            Method::GET => Operation::Read(ReadOp::Get),
            Method::HEAD => Operation::Read(ReadOp::Head),
            _ => Operation::PassThrough,
        }
    }
}
