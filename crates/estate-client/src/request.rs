//! Request description and response wrapper.
//!
//! An `ApiRequest` is captured once and may be sent twice: the first attempt
//! and, after a successful refresh, one replay. `Attempt` carries which one is
//! in flight so the replay can never trigger another refresh.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use estate_core::auth::ErrorBody;

use crate::error::{ClientError, Result};

/// Which send of a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Replay,
}

impl Attempt {
    /// Attempt that follows a successful refresh, if one is still allowed.
    pub fn next(self) -> Option<Attempt> {
        match self {
            Attempt::First => Some(Attempt::Replay),
            Attempt::Replay => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attempt::First => "first",
            Attempt::Replay => "replay",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/owner/real-estate?page=2`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| ClientError::Decode(format!("json encode failed: {e}")))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(body));
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    /// Turn non-2xx responses into `ClientError::Status`.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(ClientError::Status {
            status: self.status,
            msg: ErrorBody::parse(&self.body).map(|b| b.msg),
            body: self.body,
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("invalid response json: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn replay_is_terminal() {
        assert_eq!(Attempt::First.next(), Some(Attempt::Replay));
        assert_eq!(Attempt::Replay.next(), None);
    }

    #[test]
    fn error_for_status_extracts_msg() {
        let resp = ApiResponse {
            status: StatusCode::UNAUTHORIZED,
            headers: HeaderMap::new(),
            body: Bytes::from_static(br#"{"msg":"Access Token is not valid"}"#),
        };
        let err = resp.error_for_status().unwrap_err();
        assert!(err.is_access_token_expired());
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = ApiRequest::post("/owner/real-estate")
            .json(&serde_json::json!({"title": "2BHK"}))
            .unwrap();
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(req.body.unwrap(), Bytes::from_static(br#"{"title":"2BHK"}"#));
    }
}
