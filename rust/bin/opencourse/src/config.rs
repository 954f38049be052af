//! CLI configuration file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use opencourse_core::ServiceConfig;
use review::ActivityConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    /// Activity points per action kind.
    #[serde(default)]
    pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,

    /// Overrides `{data_dir}/data.sqlite`.
    #[serde(default)]
    pub sqlite_path: Option<String>,
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(content)?;
        if config.storage.data_dir.is_empty() {
            anyhow::bail!("storage.data_dir must not be empty");
        }
        Ok(config)
    }

    /// Storage settings in the form the store layer takes.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            data_dir: Some(PathBuf::from(&self.storage.data_dir)),
            sqlite_path: self.storage.sqlite_path.as_ref().map(PathBuf::from),
        }
    }
}
