use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infra::errors::ConfigError;

const APP_DIR: &str = "flux-player";
const CONFIG_FILE: &str = "config.json";
const SERVER_URL_ENV: &str = "FLUX_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    /// Autoplay used until the user configuration has been fetched
    pub autoplay_default: bool,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            autoplay_default: false,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Config file location under the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the file config if present, then apply the environment override.
    ///
    /// A missing or malformed file falls back to defaults.
    pub fn load() -> Self {
        let mut config = Self::default_path()
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(ConfigError::Io(err))
                    if err.kind() == std::io::ErrorKind::NotFound =>
                {
                    None
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Ignoring {}: {}",
                        path.display(),
                        err
                    );
                    None
                }
            })
            .unwrap_or_default();

        if let Ok(server_url) = std::env::var(SERVER_URL_ENV) {
            config.server_url = server_url;
        }

        config
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
