use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, fs, path::Path, path::PathBuf};

/// `[api]` table
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub url: Option<String>,
    pub key: Option<String>,
    pub put_field: String,
    pub call_field: String,
    pub timeout_ms: u64,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            put_field: "putOI".to_string(),
            call_field: "callOI".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for ApiCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCfg")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("put_field", &self.put_field)
            .field("call_field", &self.call_field)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// `[schedule]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    pub interval_ms: u64,
    pub tick_ms: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            tick_ms: 1_000,
        }
    }
}

/// `[history]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
    pub path: PathBuf,
    pub freshness_hours: u64,
    pub max_entries: Option<usize>,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("history.json"),
            freshness_hours: 24,
            max_entries: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiCfg,
    pub schedule: ScheduleCfg,
    pub history: HistoryCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {:?}", path.as_ref()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse config TOML")?;
        Ok(cfg)
    }
}
