use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";

/// Environment override for `server.bind_addr`.
pub const BIND_ENV: &str = "NBA_PREDICT_BIND";
/// Environment override for the config file location.
pub const CONFIG_PATH_ENV: &str = "NBA_PREDICT_CONFIG";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stats_api: StatsApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsApiConfig {
    #[serde(default = "default_stats_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Season string such as "2024-25". Falls back to the current season.
    #[serde(default)]
    pub season: Option<String>,
}

fn default_stats_base_url() -> String {
    "https://stats.nba.com/stats".to_string()
}
fn default_request_timeout() -> u64 { 10_000 }

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_stats_base_url(),
            request_timeout_ms: default_request_timeout(),
            season: None,
        }
    }
}

impl StatsApiConfig {
    pub fn season(&self) -> String {
        self.season
            .clone()
            .unwrap_or_else(|| season_for(chrono::Utc::now().date_naive()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
}

fn default_expiry_secs() -> u64 { 3600 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_secs: default_expiry_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictorConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_seed() -> u64 { 42 }
fn default_samples() -> usize { 1000 }
fn default_epochs() -> usize { 400 }
fn default_learning_rate() -> f64 { 0.1 }

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            samples: default_samples(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// NBA season label for a date. Seasons roll over in October:
/// 2024-11-02 -> "2024-25", 2025-03-15 -> "2024-25".
pub fn season_for(date: NaiveDate) -> String {
    let start_year = if date.month() >= 10 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var(BIND_ENV) {
            let addr = addr.trim();
            if !addr.is_empty() {
                self.server.bind_addr = addr.to_string();
            }
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}
