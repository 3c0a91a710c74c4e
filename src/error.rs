use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum KeymasterError {
    /// Encryption metadata is present on the response but no keys were
    /// supplied for the request.
    #[error("Cannot get necessary keys for path {0}")]
    MissingKeys(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Serialize for KeymasterError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<&KeymasterError> for StatusCode {
    fn from(err: &KeymasterError) -> Self {
        match err {
            KeymasterError::MissingKeys(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KeymasterError> for StatusCode {
    fn from(err: KeymasterError) -> Self {
        StatusCode::from(&err)
    }
}

impl IntoResponse for KeymasterError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        (status, self.to_string()).into_response()
    }
}

pub type KeymasterResult<T> = Result<T, KeymasterError>;
