//! Secret management service trait.
//!
//! Defines the interface for loading API keys from secure storage.

use crate::config::{ProviderKind, SecretConfig};
use crate::error::Result;
use crate::model::Credential;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;

    /// Resolves a usable credential for `provider`, or `None` if none is configured.
    async fn credential_for(&self, provider: ProviderKind) -> Option<Credential>;
}
