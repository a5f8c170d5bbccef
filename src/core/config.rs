use crate::core::budget::OVERSPEND_THRESHOLD;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Where user data is kept.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Lost when the process exits.
    Memory,
    Disk {
        data_path: Option<String>,
    },
    /// A PostgREST-compatible backend.
    Rest { base_url: String, api_key: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Disk { data_path: None }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_threshold() -> f64 {
    OVERSPEND_THRESHOLD
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// User whose session is opened by commands that need one.
    pub user_id: Option<Uuid>,
    #[serde(default = "default_threshold")]
    pub overspend_threshold: f64,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: default_currency(),
            user_id: None,
            overspend_threshold: default_threshold(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "moneymap", "moneymap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let StoreConfig::Disk {
            data_path: Some(custom_path),
        } = &self.store
        {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "moneymap", "moneymap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Writes the config back, e.g. after sign-up records the new user id.
    pub fn save_to_path<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let config_str = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path.as_ref(), config_str)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        debug!("Saved config to {}", path.as_ref().display());
        Ok(())
    }
}
