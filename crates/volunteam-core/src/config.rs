//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend addresses, the image-hosting API key, the last used email and the
//! offline flag.
//!
//! Configuration is stored at `~/.config/volunteam/config.json` and overlaid
//! with environment variables once at startup. The resulting `Config` is
//! passed explicitly to the clients.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "volunteam";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
const DEFAULT_IMAGE_API_BASE_URL: &str = "https://api.imgbb.com/1";

pub const ENV_API_URL: &str = "VOLUNTEAM_API_URL";
pub const ENV_IMAGE_API_URL: &str = "VOLUNTEAM_IMAGE_API_URL";
pub const ENV_IMAGE_API_KEY: &str = "IMGBB_API_KEY";
pub const ENV_CACHE_DIR: &str = "VOLUNTEAM_CACHE_DIR";
pub const ENV_OFFLINE: &str = "VOLUNTEAM_OFFLINE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub image_api_base_url: String,
    /// Secret; only ever read from the environment
    #[serde(skip)]
    pub image_api_key: Option<String>,
    pub last_email: Option<String>,
    pub offline_mode: bool,
    pub cache_dir: Option<PathBuf>,
    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_api_base_url: DEFAULT_IMAGE_API_BASE_URL.to_string(),
            image_api_key: None,
            last_email: None,
            offline_mode: false,
            cache_dir: None,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent) and apply the process environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_API_URL) {
            debug!(url = %url, "Backend URL from environment");
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_IMAGE_API_URL) {
            self.image_api_base_url = url;
        }
        if let Some(key) = get(ENV_IMAGE_API_KEY) {
            self.image_api_key = Some(key);
        }
        if let Some(dir) = get(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = get(ENV_OFFLINE) {
            self.offline_mode = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the last used login email in the config file. The file is
    /// re-read so environment overrides never end up on disk.
    pub fn remember_email(email: &str) -> Result<()> {
        Self::remember_email_at(&Self::config_path()?, email)
    }

    fn remember_email_at(path: &Path, email: &str) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.last_email = Some(email.to_string());
        stored.save_to(path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
