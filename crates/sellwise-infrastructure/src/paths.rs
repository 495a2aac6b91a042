//! Unified path management for sellwise configuration files.
//!
//! Paths are resolved via `AppPaths` from the version-migrate crate so every
//! platform gets its conventional config/data location.

use sellwise_core::config::{ProviderSecret, SecretConfig};
use sellwise_core::config::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use std::path::PathBuf;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for sellwise.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/sellwise/
/// ├── config.toml      # Provider, models, polling bounds
/// ├── secret.json      # API keys
/// ├── vault.json       # Saved task results
/// └── logs/
///     └── sellwise.log
/// ```
pub struct SellwisePaths;

impl SellwisePaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("sellwise")
    }

    /// Returns the sellwise configuration directory (e.g. `~/.config/sellwise/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    pub fn vault_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("vault.json"))
    }

    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating a template if it doesn't.
    ///
    /// The file is created with mode 600 on Unix.
    pub fn ensure_secret_file() -> Result<PathBuf, std::io::Error> {
        let secret_path = Self::secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        Self::ensure_secret_file_at(secret_path)
    }

    /// Same as [`Self::ensure_secret_file`] for an explicit location.
    pub fn ensure_secret_file_at(secret_path: PathBuf) -> Result<PathBuf, std::io::Error> {
        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(ProviderSecret {
                api_key: String::new(),
                model_name: Some(DEFAULT_GEMINI_MODEL.to_string()),
            }),
            openai: Some(ProviderSecret {
                api_key: String::new(),
                model_name: Some(DEFAULT_OPENAI_MODEL.to_string()),
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(std::io::Error::other)?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}
