//! Configuration for wpsync.
//!
//! [`Config`] is persisted as TOML, typically at
//! `~/.config/wpsync/config.toml` on Unix systems.
//!
//! # Key Configuration Fields
//!
//! - `base_url`: the site's `wp/v2` REST root
//! - `cache_dir`: where the local replica lives
//! - `sync_limit`: posts fetched per status each pass
//! - `sync_statuses`: which statuses are fetched
//! - `bearer_token`: credentials for pushing (overridden by `WPSYNC_TOKEN`)
//!
//! # Example
//!
//! ```ignore
//! use wpsync_core::config::Config;
//!
//! let config = Config::load()?;
//! let options = config.sync_options();
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WpSyncError};
use crate::fs::FileSystem;
use crate::sync::{DEFAULT_STATUSES, DEFAULT_WINDOW_SIZE, SyncOptions};

/// Environment variable that overrides [`Config::bearer_token`].
pub const TOKEN_ENV_VAR: &str = "WPSYNC_TOKEN";

/// Everything the user can configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// REST root of the site, e.g. `https://example.com/wp-json/wp/v2`
    pub base_url: String,

    /// Cache root directory
    pub cache_dir: PathBuf,

    /// Posts fetched per status on each sync
    #[serde(default = "default_sync_limit")]
    pub sync_limit: u32,

    /// Statuses fetched on each sync, in order
    #[serde(default = "default_sync_statuses")]
    pub sync_statuses: Vec<String>,

    /// Application password or JWT sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

fn default_sync_limit() -> u32 {
    DEFAULT_WINDOW_SIZE
}

fn default_sync_statuses() -> Vec<String> {
    DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Create a config for a site, with default sync settings.
    pub fn new(base_url: impl Into<String>, cache_dir: PathBuf) -> Self {
        Self {
            base_url: base_url.into(),
            cache_dir,
            sync_limit: default_sync_limit(),
            sync_statuses: default_sync_statuses(),
            bearer_token: None,
        }
    }

    /// Options for a sync pass.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            window_size: self.sync_limit,
            statuses: self.sync_statuses.clone(),
        }
    }

    /// Token to authenticate with: `WPSYNC_TOKEN` if set and non-empty, else the configured one.
    pub fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.bearer_token.clone())
    }

    /// Load config from a specific path.
    pub fn load_from<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| WpSyncError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to<FS: FileSystem>(&self, fs: &FS, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs.create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs.write_file(path, &contents)
            .map_err(|e| WpSyncError::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(())
    }

    /// Get the config file path (~/.config/wpsync/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wpsync").join("config.toml"))
    }

    /// Default cache root (~/.cache/wpsync, or ./wpsync-cache without a cache dir)
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("wpsync"))
            .unwrap_or_else(|| PathBuf::from("wpsync-cache"))
    }

    /// Load config from the default location.
    ///
    /// Fails with [`WpSyncError::ConfigNotInitialized`] if there is no config file yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or(WpSyncError::NoConfigDir)?;
        if !path.exists() {
            return Err(WpSyncError::ConfigNotInitialized);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(WpSyncError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Write a fresh config to the default location.
    pub fn init(
        base_url: impl Into<String>,
        cache_dir: Option<PathBuf>,
        bearer_token: Option<String>,
    ) -> Result<Self> {
        let mut config = Config::new(
            base_url,
            cache_dir.unwrap_or_else(Self::default_cache_dir),
        );
        config.bearer_token = bearer_token;
        config.save()?;
        Ok(config)
    }
}
