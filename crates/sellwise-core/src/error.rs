//! Error types for Sellwise.
//!
//! Two families live here:
//! - [`TaskError`]: the typed failure returned by every generative task.
//! - [`SellwiseError`]: infrastructure errors (storage, configuration, I/O).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Machine-distinguishable category of a task failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// Bad or missing input, or no usable credential. No network call was made.
    Precondition,
    /// The remote model call failed, errored, or was rejected.
    Upstream,
    /// The remote call succeeded but its output did not match the expected shape.
    Shape,
    /// The remote call succeeded but returned nothing usable.
    EmptyResult,
}

/// Failure of a single generative task invocation.
///
/// Every variant carries a human-readable message suitable for display.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskError {
    #[error("{message}")]
    Precondition { message: String },

    #[error("{message}")]
    Upstream {
        message: String,
        status_code: Option<u16>,
    },

    #[error("model output does not match the expected shape at `{path}`: {message}")]
    Shape { message: String, path: String },

    #[error("{message}")]
    EmptyResult { message: String },
}

impl TaskError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn upstream_with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Precondition { .. } => FailureKind::Precondition,
            Self::Upstream { .. } => FailureKind::Upstream,
            Self::Shape { .. } => FailureKind::Shape,
            Self::EmptyResult { .. } => FailureKind::EmptyResult,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

/// A shared error type for storage, configuration and other infrastructure.
#[derive(Error, Debug, Clone, Serialize)]
pub enum SellwiseError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Security/authentication error
    #[error("Security error: {0}")]
    Security(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SellwiseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SellwiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SellwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SellwiseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SellwiseError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for SellwiseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SellwiseError>`.
pub type Result<T> = std::result::Result<T, SellwiseError>;
