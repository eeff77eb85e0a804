//! Configuration management for the RND Archive CLI
//!
//! Stores the archive URL, session cookies and browse defaults in
//! ~/.config/rnd-archive/config.toml

use anyhow::{Context, Result};
use rnd_archive::services::debounce::DEFAULT_SEARCH_DELAY;
use rnd_archive::services::http_client::{DEFAULT_API_BASE_PATH, DEFAULT_TIMEOUT};
use rnd_archive::services::notifications::DEFAULT_TOAST_DURATION;
use rnd_archive::{ControllerConfig, HttpClientConfig, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_DIR: &str = "rnd-archive";
const CONFIG_FILE: &str = "config.toml";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_base_path")]
    pub api_base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_base_path() -> String {
    DEFAULT_API_BASE_PATH.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_search_delay_ms() -> u64 {
    DEFAULT_SEARCH_DELAY.as_millis() as u64
}

fn default_toast_duration_ms() -> u64 {
    DEFAULT_TOAST_DURATION.as_millis() as u64
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_base_path: default_api_base_path(),
            csrf_token: None,
            session_id: None,
            page_size: default_page_size(),
            search_delay_ms: default_search_delay_ms(),
            toast_duration_ms: default_toast_duration_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Store the cookies copied from a logged-in browser session
    pub fn set_credentials(&mut self, csrf_token: String, session_id: Option<String>) {
        self.csrf_token = Some(csrf_token);
        if session_id.is_some() {
            self.session_id = session_id;
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.csrf_token.is_some()
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig::new(&self.base_url)
            .with_api_base_path(&self.api_base_path)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(token) = &self.csrf_token {
            config = config.with_csrf_token(token);
        }
        if let Some(session) = &self.session_id {
            config = config.with_session_id(session);
        }
        config
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            page_size: self.page_size,
            search_delay: Duration::from_millis(self.search_delay_ms),
        }
    }
}
