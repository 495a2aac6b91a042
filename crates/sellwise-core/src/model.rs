//! The seam between task adapters and a remote generative-model provider.
//!
//! Implementations live in `sellwise-interaction`. Tests provide their own
//! scripted implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

use crate::error::TaskError;
use crate::media::DataUri;
use crate::shape::Shape;

/// An API key or access token, supplied per call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns `None` for blank secrets.
    pub fn non_blank(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// What a provider can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    Text,
    Image,
    Video,
}

/// A structured (JSON) generation request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub reference_image: Option<DataUri>,
    /// Name of the response schema (OpenAI requires one).
    pub schema_name: String,
    pub response_shape: Shape,
}

/// An image or video generation request.
#[derive(Debug, Clone)]
pub struct MediaRequest {
    pub prompt: String,
    pub reference_image: Option<DataUri>,
}

/// Opaque token for an in-progress remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle(pub String);

impl OperationHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status of a remote operation at one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Pending,
    /// Finished; `None` when the operation produced no media.
    Done(Option<DataUri>),
    /// The operation itself reported an error.
    Failed(String),
}

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ModelError {
    pub status_code: Option<u16>,
    pub message: String,
    /// Reported for callers; adapters never retry on their own.
    pub is_retryable: bool,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            is_retryable: false,
        }
    }

    pub fn with_status(status_code: u16, message: impl Into<String>, is_retryable: bool) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
        }
    }
}

impl From<ModelError> for TaskError {
    fn from(err: ModelError) -> Self {
        TaskError::Upstream {
            message: err.message,
            status_code: err.status_code,
        }
    }
}

/// A remote generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name for logs (e.g. `gemini`).
    fn provider(&self) -> &str;

    fn supports(&self, capability: Capability) -> bool;

    /// Returns the raw text of the reply, or `None` when the reply had no text.
    async fn generate_structured(
        &self,
        credential: &Credential,
        request: StructuredRequest,
    ) -> Result<Option<String>, ModelError>;

    /// Returns the first generated image, or `None` when the reply had none.
    async fn generate_image(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<Option<DataUri>, ModelError>;

    /// Starts an asynchronous video generation.
    async fn start_video(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<OperationHandle, ModelError>;

    /// Checks the status of a previously started operation once.
    async fn poll_operation(
        &self,
        credential: &Credential,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("sk-very-secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }

    #[test]
    fn test_blank_credential() {
        assert!(Credential::non_blank("  ").is_none());
        assert!(Credential::new("").is_blank());
        assert!(Credential::non_blank("key").is_some());
    }

    #[test]
    fn test_model_error_maps_to_upstream() {
        let err: TaskError = ModelError::with_status(429, "RESOURCE_EXHAUSTED: quota", true).into();
        assert_eq!(
            err,
            TaskError::upstream_with_status(429, "RESOURCE_EXHAUSTED: quota")
        );
    }
}
