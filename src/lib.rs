pub mod config;
pub mod crypto;
mod error;
pub mod keymaster;
pub mod path;
pub mod server;
pub mod sysmeta;

pub use error::{KeymasterError, KeymasterResult};
pub use keymaster::{CryptoOverride, FetchCryptoKeys, Keymaster};
