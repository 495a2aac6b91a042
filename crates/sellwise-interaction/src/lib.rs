//! Provider clients implementing [`GenerativeModel`].

mod http_error;

pub mod gemini_api_client;
pub mod openai_api_client;

pub use gemini_api_client::GeminiApiClient;
pub use openai_api_client::OpenAIApiClient;

use sellwise_core::config::{AppConfig, ModelSettings, ProviderKind, SecretConfig};
use sellwise_core::model::GenerativeModel;
use std::sync::Arc;

/// Model names for `provider`.
///
/// A `model_name` stored next to the key in `secret.json` overrides the
/// text model from `config.toml`.
pub fn resolve_settings(
    provider: ProviderKind,
    config: &AppConfig,
    secrets: &SecretConfig,
) -> ModelSettings {
    let mut settings = config.models_for(provider).clone();
    if let Some(model_name) = secrets.model_override(provider) {
        settings.text_model = model_name.to_string();
    }
    settings
}

/// Builds the client for `provider`.
pub fn build_model(
    provider: ProviderKind,
    config: &AppConfig,
    secrets: &SecretConfig,
) -> Arc<dyn GenerativeModel> {
    let settings = resolve_settings(provider, config, secrets);

    tracing::debug!(
        "[Interaction] Building {} client (text model: {})",
        provider,
        settings.text_model
    );

    match provider {
        ProviderKind::Gemini => Arc::new(GeminiApiClient::from_settings(&settings)),
        ProviderKind::OpenAI => Arc::new(OpenAIApiClient::from_settings(&settings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellwise_core::config::ProviderSecret;
    use sellwise_core::model::Capability;

    #[test]
    fn test_build_model_selects_provider() {
        let config = AppConfig::default();
        let secrets = SecretConfig::default();

        let gemini = build_model(ProviderKind::Gemini, &config, &secrets);
        assert_eq!(gemini.provider(), "gemini");
        assert!(gemini.supports(Capability::Video));

        let openai = build_model(ProviderKind::OpenAI, &config, &secrets);
        assert_eq!(openai.provider(), "openai");
        assert!(!openai.supports(Capability::Video));
    }

    #[test]
    fn test_build_model_applies_secret_override() {
        let secrets = SecretConfig {
            gemini: Some(ProviderSecret {
                api_key: "key".to_string(),
                model_name: Some("gemini-2.5-pro".to_string()),
            }),
            openai: None,
        };
        let config = AppConfig::default();

        let settings = resolve_settings(ProviderKind::Gemini, &config, &secrets);
        assert_eq!(settings.text_model, "gemini-2.5-pro");
        assert_eq!(settings.image_model, config.gemini.image_model);
        assert_eq!(
            GeminiApiClient::from_settings(&settings).text_model(),
            "gemini-2.5-pro"
        );

        // No override for OpenAI: the configured model stays.
        let openai = resolve_settings(ProviderKind::OpenAI, &config, &secrets);
        assert_eq!(openai.text_model, config.openai.text_model);
    }
}
