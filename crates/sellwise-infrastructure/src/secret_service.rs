//! Secret service implementation.
//!
//! Resolves API keys from `secret.json`, falling back to environment
//! variables (`GEMINI_API_KEY`, `OPENAI_API_KEY`).

use crate::storage::{SecretStorage, SecretStorageError};
use sellwise_core::config::{ProviderKind, SecretConfig};
use sellwise_core::error::Result;
use sellwise_core::model::Credential;
use sellwise_core::secret::SecretService;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Environment variable consulted for `provider` when `secret.json` has no key.
pub fn env_var_for(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => "GEMINI_API_KEY",
        ProviderKind::OpenAI => "OPENAI_API_KEY",
    }
}

/// Reads secrets once and caches them.
#[derive(Clone)]
pub struct SecretServiceImpl {
    storage: Arc<SecretStorage>,
    /// Cached secret config loaded from storage.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    /// Reads an environment variable; replaced in tests.
    env_lookup: Arc<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl SecretServiceImpl {
    /// Uses the default secret file location.
    pub fn new() -> Result<Self> {
        let storage = SecretStorage::new()?;
        Ok(Self::from_storage(storage))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self::from_storage(SecretStorage::with_path(path))
    }

    fn from_storage(storage: SecretStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            secrets: Arc::new(RwLock::new(None)),
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Overrides how environment variables are read.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(lookup);
        self
    }

    fn load_cached(&self) -> Result<SecretConfig> {
        if let Ok(guard) = self.secrets.read() {
            if let Some(cached) = guard.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = match self.storage.load() {
            Ok(config) => config,
            // A missing file is not an error; env vars may still provide keys
            Err(SecretStorageError::NotFound(_)) => SecretConfig::default(),
            Err(e) => return Err(e.into()),
        };

        if let Ok(mut guard) = self.secrets.write() {
            *guard = Some(loaded.clone());
        }
        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.load_cached()
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.exists()
    }

    async fn credential_for(&self, provider: ProviderKind) -> Option<Credential> {
        match self.load_cached() {
            Ok(secrets) => {
                if let Some(credential) = secrets.credential_for(provider) {
                    return Some(credential);
                }
            }
            Err(e) => {
                tracing::warn!("[SecretService] Failed to load secret file: {}", e);
            }
        }

        (self.env_lookup)(env_var_for(provider))
            .and_then(|key: String| Credential::non_blank(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn test_file_key_wins_over_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{ "gemini": { "api_key": "from-file" } }"#).unwrap();

        let service = SecretServiceImpl::with_path(path)
            .with_env_lookup(|_| Some("from-env".to_string()));
        let credential = service.credential_for(ProviderKind::Gemini).await.unwrap();
        assert_eq!(credential.expose(), "from-file");
    }

    #[tokio::test]
    async fn test_env_fallback_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::with_path(temp_dir.path().join("secret.json"))
            .with_env_lookup(|name| (name == "OPENAI_API_KEY").then(|| "sk-env".to_string()));

        assert!(!service.secret_file_exists().await);
        let credential = service.credential_for(ProviderKind::OpenAI).await.unwrap();
        assert_eq!(credential.expose(), "sk-env");
        assert!(service.credential_for(ProviderKind::Gemini).await.is_none());
    }

    #[tokio::test]
    async fn test_blank_keys_resolve_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{ "gemini": { "api_key": "  " } }"#).unwrap();

        let service = SecretServiceImpl::with_path(path).with_env_lookup(no_env);
        assert!(service.credential_for(ProviderKind::Gemini).await.is_none());
    }

    #[tokio::test]
    async fn test_secrets_are_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{ "gemini": { "api_key": "first" } }"#).unwrap();

        let service = SecretServiceImpl::with_path(path.clone()).with_env_lookup(no_env);
        assert_eq!(
            service.load_secrets().await.unwrap().gemini.unwrap().api_key,
            "first"
        );

        std::fs::write(&path, r#"{ "gemini": { "api_key": "second" } }"#).unwrap();
        assert_eq!(
            service.load_secrets().await.unwrap().gemini.unwrap().api_key,
            "first"
        );
    }
}
