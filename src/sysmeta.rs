use axum::http::{HeaderMap, HeaderName};

use crate::path::ServerType;

/// Persisted object sysmeta header carrying the key id token.
pub const CRYPTO_ID_HEADER: &str = "x-object-sysmeta-crypto-id";

/// Local-name prefix of encryption metadata written by the crypto layer.
const CRYPTO_META_PREFIX: &str = "crypto-meta-";

/// `x-<server_type>-sysmeta-`
pub fn sys_meta_prefix(server_type: ServerType) -> String {
    format!("x-{}-sysmeta-", server_type.as_str())
}

/// Prefix for object sysmeta that the storage service persists with the object.
pub fn obj_persisted_sysmeta_prefix() -> String {
    sys_meta_prefix(ServerType::Object)
}

pub fn crypto_id_header() -> HeaderName {
    HeaderName::from_static(CRYPTO_ID_HEADER)
}

/// Case-insensitive check for a sysmeta header of the given server type.
pub fn is_sys_meta(server_type: ServerType, name: &str) -> bool {
    let prefix = sys_meta_prefix(server_type);
    name.len() > prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(&prefix)
}

/// Local name of a sysmeta header, i.e. the header name without its
/// `x-<server_type>-sysmeta-` prefix.
pub fn strip_sys_meta_prefix(server_type: ServerType, name: &str) -> &str {
    let prefix_len = sys_meta_prefix(server_type).len();
    name.get(prefix_len..).unwrap_or("")
}

/// Whether any header carries encryption metadata for `server_type`, which
/// means keys are needed to serve the response.
pub fn has_crypto_meta(server_type: ServerType, headers: &HeaderMap) -> bool {
    headers.keys().any(|name| {
        let name = name.as_str();
        is_sys_meta(server_type, name)
            && strip_sys_meta_prefix(server_type, name)
                .to_ascii_lowercase()
                .starts_with(CRYPTO_META_PREFIX)
    })
}
