//! Service configuration, read from the environment (and `.env` when present).

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_MODEL_PATH: &str = "CARBON_MODEL_PATH";
pub const ENV_FACTORS_PATH: &str = "CARBON_FACTORS_PATH";
pub const ENV_BIND_ADDR: &str = "CARBON_BIND_ADDR";
pub const ENV_LOG: &str = "CARBON_LOG";

pub const DEFAULT_MODEL_PATH: &str = "carbon_emission_model.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_LOG_FILTER: &str = "waste_carbon=info,tower_http=info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Serialized regression pipeline
    pub model_path: PathBuf,
    /// Optional replacement for the built-in emission factor table
    pub factors_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            factors_path: None,
            bind_addr: DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 5000))),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get(ENV_BIND_ADDR) {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .with_context(|| format!("{} is not a socket address: {}", ENV_BIND_ADDR, raw))?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            model_path: get(ENV_MODEL_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            factors_path: get(ENV_FACTORS_PATH).map(PathBuf::from),
            bind_addr,
            log_filter: get(ENV_LOG)
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
        })
    }
}
