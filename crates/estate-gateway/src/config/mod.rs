//! Gateway config loader (strict parsing).

pub mod schema;

use estate_core::error::{EstateError, Result};

pub use schema::{GatewayConfig, GatewaySection, PresenceSection};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "ESTATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "estate.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub async fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EstateError::InvalidConfig(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| EstateError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
