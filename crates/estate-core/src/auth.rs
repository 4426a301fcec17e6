//! Auth contracts: actor kinds, the persisted session record, and the HTTP
//! body shapes exchanged with the refresh endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact `msg` value the backend sends with a 401 when the access token has
/// expired. Any other 401 body is a plain failure.
pub const ACCESS_TOKEN_EXPIRED_MSG: &str = "Access Token is not valid";

/// Which side of the marketplace a user acts as. Selects the refresh
/// endpoint and the route set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Owner,
    Tenant,
}

impl ActorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorKind::Owner => "owner",
            ActorKind::Tenant => "tenant",
        }
    }

    /// Path of the refresh endpoint, relative to the API base.
    pub fn refresh_path(self) -> String {
        format!("/auth/{}/refresh", self.as_str())
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side session record. Persisted as-is to durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "userType", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<ActorKind>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_type: ActorKind) -> Self {
        Self {
            access_token: Some(access_token.into()),
            user_type: Some(user_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.user_type.is_none()
    }
}

/// Conventional error body: `{ "msg": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}

impl ErrorBody {
    /// Parse an error body leniently; anything that is not `{msg: string}`
    /// yields `None`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

/// Body returned by `GET /auth/{userType}/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn refresh_path_per_actor() {
        assert_eq!(ActorKind::Owner.refresh_path(), "/auth/owner/refresh");
        assert_eq!(ActorKind::Tenant.refresh_path(), "/auth/tenant/refresh");
    }

    #[test]
    fn session_uses_storage_keys() {
        let s = Session::new("abc", ActorKind::Tenant);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["token"], "abc");
        assert_eq!(v["userType"], "tenant");

        let empty: Session = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn error_body_parse_is_lenient() {
        let b = ErrorBody::parse(br#"{"msg":"Access Token is not valid"}"#).unwrap();
        assert_eq!(b.msg, ACCESS_TOKEN_EXPIRED_MSG);

        assert!(ErrorBody::parse(b"Unauthorized").is_none());
        assert!(ErrorBody::parse(br#"{"error":"x"}"#).is_none());
    }
}
