// src/config/service.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::warn;

use crate::transfer::{self, DynTransfer};

pub const ENV_CONFIG_PATH: &str = "FORECAST_CONFIG_PATH";
pub const ENV_SERVICE_URL: &str = "FORECAST_SERVICE_URL";
pub const ENV_TIMEOUT_SECS: &str = "FORECAST_TIMEOUT_SECS";
pub const ENV_TRANSFER_DELAY_MS: &str = "FORECAST_TRANSFER_DELAY_MS";

pub const DEFAULT_CONFIG_TOML: &str = "config/service.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/service.json";

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}
fn default_forecast_path() -> String {
    "/forecast".to_string()
}
fn default_history_path() -> String {
    "/api/history".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_transfer_delay_ms() -> u64 {
    800
}
fn default_user_agent() -> String {
    concat!("coffee-forecast-intake/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_forecast_path")]
    pub forecast_path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout; elapsed timeouts surface as transport errors.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Latency of the per-factor loading phase. 0 settles immediately.
    #[serde(default = "default_transfer_delay_ms")]
    pub transfer_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            forecast_path: default_forecast_path(),
            history_path: default_history_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            transfer_delay_ms: default_transfer_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServiceConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading service config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: ServiceConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg)
    }

    /// Resolution order:
    /// 1) $FORECAST_CONFIG_PATH
    /// 2) config/service.toml
    /// 3) config/service.json
    /// 4) built-in defaults
    ///
    /// Env overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_TOML).exists() {
            Self::load_from_file(DEFAULT_CONFIG_TOML)?
        } else if Path::new(DEFAULT_CONFIG_JSON).exists() {
            Self::load_from_file(DEFAULT_CONFIG_JSON)?
        } else {
            Self::default()
        };
        Ok(cfg.with_env_overrides())
    }

    /// Apply FORECAST_SERVICE_URL / FORECAST_TIMEOUT_SECS / FORECAST_TRANSFER_DELAY_MS.
    /// Unparseable numbers are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(ENV_SERVICE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.base_url = url.to_string();
            }
        }
        if let Some(v) = parse_u64_env(ENV_TIMEOUT_SECS) {
            self.timeout_secs = v;
        }
        if let Some(v) = parse_u64_env(ENV_TRANSFER_DELAY_MS) {
            self.transfer_delay_ms = v;
        }
        self
    }

    pub fn forecast_url(&self) -> String {
        join_url(&self.base_url, &self.forecast_path)
    }

    pub fn history_url(&self) -> String {
        join_url(&self.base_url, &self.history_path)
    }

    /// Shared HTTP client for submission and history calls.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .context("building forecast service HTTP client")
    }

    pub fn transfer(&self) -> DynTransfer {
        transfer::for_delay_ms(self.transfer_delay_ms)
    }
}

fn parse_u64_env(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target: "config", var = name, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
