// src/config.rs
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides `registry_api_key` from the file.
pub const API_KEY_ENV: &str = "REGISTRY_API_KEY";

/// Setting this to "dev" disables the inter-cycle pacing sleep.
pub const ENV_MODE: &str = "BOSTADSMATCH_ENV";

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {msg}"),
            ConfigError::MissingApiKey => write!(
                f,
                "registry api key not set (config `registry_api_key` or {API_KEY_ENV})"
            ),
        }
    }
}

impl Error for ConfigError {}

/// One portal location partition. `id` is the portal's location id and doubles
/// as the store partition key; `name` is the human-readable location used in
/// search queries and report filenames.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub locations: Vec<LocationConfig>,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Usually left out of the file and supplied via REGISTRY_API_KEY.
    #[serde(default)]
    pub registry_api_key: Option<String>,

    /// Base URL of the token-vending service for the person registry.
    pub token_endpoint: String,

    /// Reconciliation attempts per record before it is abandoned.
    #[serde(default = "default_max_retry")]
    pub max_retry: u32,

    /// `[min, max]` seconds slept between worker cycles.
    #[serde(default = "default_idle_sleep")]
    pub idle_sleep_secs: [u64; 2],
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_max_retry() -> u32 {
    3
}

fn default_idle_sleep() -> [u64; 2] {
    [60, 90]
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{path}: {e}")))?;
        let config: Config =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(format!("{path}: {e}")))?;
        Ok(config)
    }

    /// Environment wins over the config file so the key can stay out of
    /// version-controlled config.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.registry_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn is_dev() -> bool {
        std::env::var(ENV_MODE).map(|v| v == "dev").unwrap_or(false)
    }
}
