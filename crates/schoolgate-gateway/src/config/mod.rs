//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use schoolgate_core::error::{GateError, Result};

pub use schema::{
    BackendConfig, GatewayConfig, GatewaySection, LookupSection, RateLimitSection, RoutesSection,
    SessionSection,
};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SCHOOLGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "schoolgate.yaml";

pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GateError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| GateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
