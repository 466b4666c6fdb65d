use crate::cli::Args;
use crate::core::error::ShopError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_post_chat_refresh_delay_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Zero turns the background poll off.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_post_chat_refresh_delay_ms")]
    pub post_chat_refresh_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            post_chat_refresh_delay_ms: default_post_chat_refresh_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shopchat")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Reads the config file, creating it with defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Config, ShopError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                return Ok(Config::default());
            }
            return serde_yml::from_str::<Config>(&contents)
                .map_err(|e| ShopError::Config(format!("Parse {}: {}", path.display(), e)));
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            tracing::debug!(path = %path.display(), error = %e, "Could not write default config");
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ShopError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    /// Loads the file named on the command line (or the default one) and
    /// layers the command-line overrides on top. `API_URL` from the
    /// environment arrives through `args.api_url`.
    pub fn load(args: &Args) -> Result<Config, ShopError> {
        let path = args.config.clone().unwrap_or_else(Self::default_path);
        let mut config = Self::load_from(&path)?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(api_url) = &args.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(poll) = args.poll_interval_ms {
            self.poll_interval_ms = poll;
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        let url = Url::parse(self.api_url.trim())
            .map_err(|e| ShopError::Config(format!("Invalid api_url '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(ShopError::Config(format!(
                "api_url must be an http(s) URL with a host, got '{}'",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ShopError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }

    pub fn post_chat_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.post_chat_refresh_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
