use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";
const DEFAULT_CHANNEL_ID: &str = "2934236";
const DEFAULT_READ_API_KEY: &str = "9BUGGJ8NRHUPEZ77";
const DEFAULT_WRITE_API_KEY: &str = "8PQPLX4KOED80FU5";
const DEFAULT_RESULTS: usize = 10;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:7979";

const CONFIG_ENV_VAR: &str = "ENVIRODASH_CONFIG";
const CONFIG_FILE: &str = "envirodash.toml";

/// Runtime configuration. Defaults point at the demo channel, so the binary
/// works with no config file at all; a TOML file overrides any subset.
#[derive(Deserialize, Clone, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: String,
    pub channel_id: String,
    pub read_api_key: String,
    pub write_api_key: String,
    pub results: usize,
    pub refresh_interval_secs: u64,
    pub listen_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            read_api_key: DEFAULT_READ_API_KEY.to_string(),
            write_api_key: DEFAULT_WRITE_API_KEY.to_string(),
            results: DEFAULT_RESULTS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration: the file named by `ENVIRODASH_CONFIG` if set,
    /// else `envirodash.toml` in the working directory if present, else the
    /// built-in defaults. An explicitly named file must load; the default
    /// file is optional.
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Config::from_file(&path);
        }
        if Path::new(CONFIG_FILE).exists() {
            return Config::from_file(CONFIG_FILE);
        }
        Ok(Config::default())
    }

    pub fn from_file(path: &str) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
