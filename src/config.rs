use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeymasterError, KeymasterResult};

/// Placeholder root secret. Unsuitable for anything but testing.
pub const DEFAULT_ROOT_SECRET: &str = "secret";

const ROOT_SECRET_ENV: &str = "KEYMASTER_ROOT_SECRET";
const LISTEN_ADDR_ENV: &str = "KEYMASTER_LISTEN_ADDR";
const UPSTREAM_URL_ENV: &str = "KEYMASTER_UPSTREAM_URL";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymasterConfig {
    /// Root key all path keys are derived from (UTF-8 bytes).
    pub root_secret: String,
    pub listen_addr: String,
    /// Object server the host forwards requests to.
    pub upstream_url: String,
    /// Answer 422 when a read needs keys that could not be resolved.
    pub enforce_key_requirement: bool,
    pub max_body_bytes: u64,
}

impl Default for KeymasterConfig {
    fn default() -> Self {
        Self {
            root_secret: DEFAULT_ROOT_SECRET.to_string(),
            listen_addr: "127.0.0.1:8090".to_string(),
            upstream_url: "http://127.0.0.1:8080".to_string(),
            enforce_key_requirement: true,
            max_body_bytes: 5 * 1024 * 1024 * 1024,
        }
    }
}

impl std::fmt::Debug for KeymasterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeymasterConfig")
            .field("root_secret", &"<redacted>")
            .field("listen_addr", &self.listen_addr)
            .field("upstream_url", &self.upstream_url)
            .field("enforce_key_requirement", &self.enforce_key_requirement)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl KeymasterConfig {
    /// Load from a JSON file (defaults if it does not exist), then apply
    /// environment overrides.
    pub fn load(path: &Path) -> KeymasterResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> KeymasterResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            KeymasterError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            KeymasterError::Config(format!("invalid config {}: {}", path.display(), e))
        })
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(ROOT_SECRET_ENV) {
            self.root_secret = secret;
        }
        if let Some(addr) = lookup(LISTEN_ADDR_ENV) {
            self.listen_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup(UPSTREAM_URL_ENV) {
            self.upstream_url = url.trim().to_string();
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.root_secret == DEFAULT_ROOT_SECRET
    }

    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_body_bytes).unwrap_or(usize::MAX)
    }
}
