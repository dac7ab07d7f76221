use std::{collections::HashMap, fs, path::Path, time::Duration};

use thiserror::Error;

use crate::feed::DEFAULT_FEED_RETRY_INTERVAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub contest_id: u32,
    pub feed_retry_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            contest_id: 5,
            feed_retry_interval: DEFAULT_FEED_RETRY_INTERVAL,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for '{key}' in config file")]
    InvalidValue { key: String, value: String },
}

impl ClientConfig {
    /// Strict file load: defaults overlaid with the file's keys, erroring on
    /// unreadable files and unparseable values. All values are written as
    /// strings (`contest_id = "5"`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let file_cfg: HashMap<String, String> =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: shown,
                source,
            })?;

        let mut config = Self::default();
        if let Some(v) = file_cfg.get("server_url") {
            config.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("contest_id") {
            config.contest_id = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "contest_id".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = file_cfg.get("feed_retry_ms") {
            let ms: u64 = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "feed_retry_ms".into(),
                value: v.clone(),
            })?;
            config.feed_retry_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Forgiving load for embedding apps: defaults, then an optional
/// `board.toml` in the working directory, then `APP__*` environment
/// overrides. Malformed pieces are skipped rather than fatal.
pub fn load_config() -> ClientConfig {
    let mut config = ClientConfig::default();

    if let Ok(raw) = fs::read_to_string("board.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                config.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("contest_id") {
                if let Ok(parsed) = v.parse::<u32>() {
                    config.contest_id = parsed;
                }
            }
            if let Some(v) = file_cfg.get("feed_retry_ms") {
                if let Ok(parsed) = v.parse::<u64>() {
                    config.feed_retry_interval = Duration::from_millis(parsed);
                }
            }
        }
    }

    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        config.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__CONTEST_ID") {
        if let Ok(parsed) = v.parse::<u32>() {
            config.contest_id = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__FEED_RETRY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            config.feed_retry_interval = Duration::from_millis(parsed);
        }
    }

    config
}
