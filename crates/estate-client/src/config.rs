//! Client configuration.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API origin every request path is resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: ClientConfig = serde_yaml::from_str(s)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid yaml: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.refresh_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "refresh_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("base_url {}: {e}", self.base_url)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "base_url {} cannot be a base",
                self.base_url
            )));
        }
        Ok(url)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".into()
}
fn default_refresh_timeout_ms() -> u64 {
    10000
}
fn default_request_timeout_ms() -> u64 {
    30000
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn yaml_defaults() {
        let cfg =
            ClientConfig::from_yaml_str("base_url: \"https://api.example.com/api\"\n").unwrap();
        assert_eq!(cfg.refresh_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.base_url().unwrap().path(), "/api");
    }

    #[test]
    fn rejects_unknown_fields_and_zero_timeout() {
        for bad in [
            "base_urll: \"x\"\n",
            "refresh_timeout_ms: 0\n",
            "request_timeout_ms: 0\n",
            "base_url: \"not a url\"\n",
            "base_url: \"mailto:ops@example.com\"\n",
        ] {
            let err = ClientConfig::from_yaml_str(bad).unwrap_err();
            assert!(matches!(err, ClientError::InvalidConfig(_)), "input={bad:?} err={err:?}");
        }
    }
}
