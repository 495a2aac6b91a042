//! Configuration models for `config.toml` and `secret.json`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

use crate::model::Credential;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_VIDEO_MODEL: &str = "veo-3.0-generate-001";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "gpt-image-1";

/// Which remote provider backs the task adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAI,
}

/// Model names for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub text_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_model: Option<String>,
}

impl ModelSettings {
    pub fn gemini_defaults() -> Self {
        Self {
            text_model: DEFAULT_GEMINI_MODEL.to_string(),
            image_model: Some(DEFAULT_GEMINI_IMAGE_MODEL.to_string()),
            video_model: Some(DEFAULT_GEMINI_VIDEO_MODEL.to_string()),
        }
    }

    pub fn openai_defaults() -> Self {
        Self {
            text_model: DEFAULT_OPENAI_MODEL.to_string(),
            image_model: Some(DEFAULT_OPENAI_IMAGE_MODEL.to_string()),
            video_model: None,
        }
    }
}

/// Bounds for polling asynchronous media operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub max_polls: u32,
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            max_polls: 60,
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub gemini: ModelSettings,
    pub openai: ModelSettings,
    pub polling: PollSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            gemini: ModelSettings::gemini_defaults(),
            openai: ModelSettings::openai_defaults(),
            polling: PollSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn models_for(&self, provider: ProviderKind) -> &ModelSettings {
        match provider {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAI => &self.openai,
        }
    }
}

/// API key entry for one provider in `secret.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSecret {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<ProviderSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ProviderSecret>,
}

impl SecretConfig {
    /// Non-blank credential for `provider`, if configured.
    pub fn credential_for(&self, provider: ProviderKind) -> Option<Credential> {
        let secret = match provider {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::OpenAI => self.openai.as_ref(),
        }?;
        Credential::non_blank(secret.api_key.clone())
    }

    /// Model override stored next to the key, if any.
    pub fn model_override(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::OpenAI => self.openai.as_ref(),
        }
        .and_then(|secret| secret.model_name.as_deref())
    }
}
