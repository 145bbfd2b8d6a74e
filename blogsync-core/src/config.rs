use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

const APP_DIR: &str = "blogsync";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub request_timeout_seconds: u64,
    pub retry_attempts: u8,
    pub retry_backoff_ms: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding `blogs.json` and `posts.json`. Falls back to the
    /// platform data directory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            retry_attempts: 3,
            retry_backoff_ms: 250,
            max_redirects: 5,
            user_agent: format!("blogsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u8) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        let mut dir = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        dir.push(APP_DIR);
        dir
    }
}

impl SyncConfig {
    /// Path of the default configuration file, e.g. `~/.config/blogsync/config.json`.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join("config.json"))
    }

    /// Loads the default configuration file. See [`SyncConfig::load_or_init`].
    pub fn load() -> Self {
        match Self::config_file_path() {
            Ok(path) => Self::load_or_init(&path),
            Err(err) => {
                warn!(error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    /// Loads `path`, falling back to defaults on any error. Defaults are
    /// written out only when the file does not exist yet; an unreadable or
    /// malformed file is left untouched.
    pub fn load_or_init(path: &Path) -> Self {
        let err = match Self::load_from(path) {
            Ok(config) => return config,
            Err(err) => err,
        };

        let config = Self::default();
        match err {
            ConfigError::Io(io_err) if io_err.kind() == ErrorKind::NotFound => {
                if let Err(save_err) = config.save_to(path) {
                    warn!(error = %save_err, path = %path.display(), "failed to save default configuration");
                }
            }
            err => {
                warn!(error = %err, path = %path.display(), "failed to load configuration, using defaults");
            }
        }
        config
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
