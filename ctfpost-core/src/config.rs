//! Process configuration at ~/.config/ctfpost/config.toml
//!
//! This is bootstrap configuration (credentials, endpoints, where the store
//! lives). Runtime settings that commands change live in the store document.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_CTFTIME_API_URL, DEFAULT_FETCH_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TELEGRAM_API_URL,
};
use crate::error::{CoreError, CoreResult};

const ENV_PREFIX: &str = "CTFPOST";

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ctfpost")
        .join("data.json")
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_ctftime_api_url() -> String {
    DEFAULT_CTFTIME_API_URL.to_string()
}

fn default_fetch_limit() -> u32 {
    DEFAULT_FETCH_LIMIT
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    #[serde(default = "default_ctftime_api_url")]
    pub ctftime_api_url: String,

    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn config_path() -> CoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoreError::Config("Could not determine config directory".into()))?
            .join("ctfpost");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template on first use.
    pub fn load() -> CoreResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load `path` (optional) layered with `CTFPOST_*` environment variables.
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let mut config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.data_file =
            PathBuf::from(shellexpand::tilde(&config.data_file.to_string_lossy()).into_owned());
        config.bot_token = config.bot_token.filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    /// The bot token, or a bootstrap error explaining how to set it.
    pub fn require_bot_token(&self) -> CoreResult<&str> {
        self.bot_token.as_deref().ok_or_else(|| {
            CoreError::Config(
                "No bot token configured. Set bot_token in config.toml or CTFPOST_BOT_TOKEN".into(),
            )
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CoreResult<()> {
        let contents = format!(
            "\
# ctfpost configuration

# Telegram bot token (or set CTFPOST_BOT_TOKEN):
# bot_token = \"123456:ABC...\"

# Where channel and event state is kept:
# data_file = \"~/.local/share/ctfpost/data.json\"

# API endpoints:
# telegram_api_url = \"{}\"
# ctftime_api_url = \"{}\"

# Maximum events per CTFtime query, and HTTP timeout in seconds:
# fetch_limit = {}
# request_timeout_secs = {}
",
            DEFAULT_TELEGRAM_API_URL,
            DEFAULT_CTFTIME_API_URL,
            DEFAULT_FETCH_LIMIT,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
