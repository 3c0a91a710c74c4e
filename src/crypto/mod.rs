pub mod derive;
pub mod token;

pub use derive::{DerivedKey, KeyDeriver, KeyScope, KeySet, KEY_LEN};
pub use token::{KeyIdToken, MalformedToken, TokenResolution};
