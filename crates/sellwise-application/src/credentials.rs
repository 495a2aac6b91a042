//! Credential resolution for adapters that are not handed a key per call.

use async_trait::async_trait;
use sellwise_core::config::ProviderKind;
use sellwise_core::model::Credential;
use sellwise_core::secret::SecretService;
use std::sync::Arc;

/// Supplies a credential when the caller did not pass one.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self) -> Option<Credential>;
}

/// Always resolves to the same credential.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

#[async_trait]
impl CredentialResolver for StaticCredential {
    async fn resolve(&self) -> Option<Credential> {
        Some(self.0.clone())
    }
}

/// Resolves the key for one provider through a [`SecretService`]
/// (secret file first, then environment).
#[derive(Clone)]
pub struct SecretServiceResolver {
    secrets: Arc<dyn SecretService>,
    provider: ProviderKind,
}

impl SecretServiceResolver {
    pub fn new(secrets: Arc<dyn SecretService>, provider: ProviderKind) -> Self {
        Self { secrets, provider }
    }
}

#[async_trait]
impl CredentialResolver for SecretServiceResolver {
    async fn resolve(&self) -> Option<Credential> {
        self.secrets.credential_for(self.provider).await
    }
}
