//! Application configuration storage
//!
//! Handles persistent storage of the product variant, model connection
//! settings and the default export directory.

use std::path::{Path, PathBuf};

use inference::constants::{backends, defaults};
use inference::BackendConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::bundle::Variant;
use crate::constants::storage::{APP_DIR, CONFIG_FILE, FALLBACK_DIR};

/// Model connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Backend name as registered in the inference registry ("OpenAI", "Ollama")
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Server base URL override; backend default when unset
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for hosted providers
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_backend() -> String {
    backends::OPENAI.to_string()
}

fn default_model() -> String {
    defaults::MODEL.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: None,
            model: default_model(),
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelConfig {
    /// Settings handed to the backend on start
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Which shape of code sessions work with
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub model: ModelConfig,
    /// Default directory for archives and preview documents
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from disk, defaults when no file exists
    pub async fn load(app_data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = app_data_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, app_data_dir: &Path) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(app_data_dir).await?;

        let config_path = app_data_dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents).await?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(config_path)
    }

    /// Directory for exports: the configured one, else `fallback`
    pub fn export_dir_or(&self, fallback: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Platform data directory for the application, `./.web-weaver` when the
/// platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
