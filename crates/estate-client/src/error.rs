//! Client error type.

use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

use estate_core::auth::ACCESS_TOKEN_EXPIRED_MSG;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. `msg` is the `{msg}` field of the body, if any.
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        msg: Option<String>,
        body: Bytes,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid request path: {0}")]
    InvalidPath(String),
    #[error("no stored actor kind to refresh with")]
    NoSession,
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("session storage: {0}")]
    Storage(String),
}

impl ClientError {
    /// `true` only for a 401 carrying the exact expiry marker.
    pub fn is_access_token_expired(&self) -> bool {
        matches!(
            self,
            ClientError::Status { status, msg: Some(m), .. }
                if *status == StatusCode::UNAUTHORIZED && m == ACCESS_TOKEN_EXPIRED_MSG
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// User-facing text: the backend's `msg` when present, otherwise the
    /// error itself.
    pub fn message(&self) -> String {
        match self {
            ClientError::Status { msg: Some(m), .. } => m.clone(),
            other => other.to_string(),
        }
    }
}
