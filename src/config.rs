use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

/// Runtime configuration, read from the environment. LINE credentials are
/// required at startup; the lottery upstream is checked lazily because the
/// relay is useful without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub line: LineConfig,
    pub lotto: LottoConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
}

#[derive(Debug, Clone)]
pub struct LottoConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            line: LineConfig {
                channel_access_token: require_env("LINE_CHANNEL_ACCESS_TOKEN")?,
                channel_secret: require_env("LINE_CHANNEL_SECRET")?,
            },
            lotto: LottoConfig {
                base_url: optional_env("LOTTO_API_BASE_URL"),
            },
            server: ServerConfig {
                port: optional_env("PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default_port()),
                data_dir: optional_env("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    match optional_env(key) {
        Some(value) => Ok(value),
        None => bail!("Missing env: {}", key),
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
