//! `config.toml` storage.

use crate::paths::SellwisePaths;
use crate::storage::atomic_file::AtomicFile;
use sellwise_core::config::AppConfig;
use sellwise_core::error::{Result, SellwiseError};
use std::path::{Path, PathBuf};

/// Loads and saves [`AppConfig`]. A missing file yields defaults.
pub struct ConfigStorage {
    file: AtomicFile<AppConfig>,
}

impl ConfigStorage {
    pub fn new() -> Result<Self> {
        let path = SellwisePaths::config_file()
            .map_err(|e| SellwiseError::config(format!("Failed to get config path: {}", e)))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::toml(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn load(&self) -> Result<AppConfig> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }

    /// Writes defaults if no config file exists yet. Returns `true` if it wrote one.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.file.path().exists() {
            return Ok(false);
        }
        self.save(&AppConfig::default())?;
        Ok(true)
    }
}
