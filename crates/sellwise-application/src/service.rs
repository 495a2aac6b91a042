//! Marketplace Agent Service
//!
//! Typed entry points for the agents sellers use most, plus a generic
//! [`MarketplaceAgentService::run`] for every other [`TaskKind`].

use anyhow::{Context, Result};
use sellwise_core::config::{AppConfig, ProviderKind};
use sellwise_core::error::TaskError;
use sellwise_core::media::DataUri;
use sellwise_core::model::{Credential, GenerativeModel};
use sellwise_core::secret::SecretService;
use sellwise_core::task::TaskInput;
use serde::Serialize;
use std::sync::Arc;

use crate::adapter::{InvocationObserver, TaskAdapter, TaskResult};
use crate::agents::{
    GeneratedMedia, KeywordFinderResult, ListingOptimizerResult, PerformanceNarrativeResult,
    ReviewReplyResult, TaskKind,
};
use crate::credentials::{CredentialResolver, SecretServiceResolver};
use crate::polling::{PollPolicy, Sleeper, TokioSleeper};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordFinderRequest {
    pub product_name: String,
    pub category: String,
    pub marketplace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOptimizerRequest {
    pub product_name: String,
    pub category: String,
    pub marketplace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReplyRequest {
    pub review_text: String,
    pub rating: u8,
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub revenue: f64,
    pub orders: u64,
    pub ad_spend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceNarrativeRequest {
    pub period_label: String,
    pub metrics: PerformanceMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_period: Option<String>,
}

/// Input for both media tasks. `style` applies to images,
/// `duration_seconds` to videos.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMediaRequest {
    pub product_name: String,
    pub scene_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip)]
    pub reference_image: Option<DataUri>,
}

/// Service running catalog tasks against one model.
#[derive(Clone)]
pub struct MarketplaceAgentService {
    model: Arc<dyn GenerativeModel>,
    resolver: Option<Arc<dyn CredentialResolver>>,
    observer: Option<Arc<dyn InvocationObserver>>,
    poll_policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl MarketplaceAgentService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            resolver: None,
            observer: None,
            poll_policy: PollPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Wires the configured provider, its key resolution and poll bounds.
    pub async fn from_config(
        config: &AppConfig,
        provider: ProviderKind,
        secrets: Arc<dyn SecretService>,
    ) -> Result<Self> {
        let secret_config = secrets
            .load_secrets()
            .await
            .context("Failed to load secret configuration")?;
        let model = sellwise_interaction::build_model(provider, config, &secret_config);

        tracing::debug!(
            "[MarketplaceAgentService] Using provider {} (poll every {}s, at most {} times)",
            provider,
            config.polling.interval_secs,
            config.polling.max_polls
        );

        Ok(Self::new(model)
            .with_resolver(Arc::new(SecretServiceResolver::new(secrets, provider)))
            .with_poll_policy(config.polling.into()))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn model(&self) -> &Arc<dyn GenerativeModel> {
        &self.model
    }

    /// Builds the adapter for `kind` with this service's wiring.
    pub fn adapter(&self, kind: TaskKind) -> TaskAdapter {
        let mut adapter = TaskAdapter::new(kind.definition(), Arc::clone(&self.model))
            .with_poll_policy(self.poll_policy)
            .with_sleeper(Arc::clone(&self.sleeper));
        if let Some(resolver) = &self.resolver {
            adapter = adapter.with_resolver(Arc::clone(resolver));
        }
        if let Some(observer) = &self.observer {
            adapter = adapter.with_observer(Arc::clone(observer));
        }
        adapter
    }

    pub async fn run(&self, kind: TaskKind, input: &TaskInput) -> Result<TaskResult, TaskError> {
        self.adapter(kind).run(input, None).await
    }

    /// Runs any task with an optional reference image and explicit credential.
    pub async fn run_with(
        &self,
        kind: TaskKind,
        input: &TaskInput,
        reference_image: Option<&DataUri>,
        credential: Option<Credential>,
    ) -> Result<TaskResult, TaskError> {
        self.adapter(kind)
            .run_with_reference(input, reference_image, credential)
            .await
    }

    pub async fn find_keywords(
        &self,
        request: &KeywordFinderRequest,
    ) -> Result<KeywordFinderResult, TaskError> {
        self.run_typed(TaskKind::KeywordFinder, request).await
    }

    pub async fn optimize_listing(
        &self,
        request: &ListingOptimizerRequest,
    ) -> Result<ListingOptimizerResult, TaskError> {
        self.run_typed(TaskKind::ListingOptimizer, request).await
    }

    pub async fn draft_review_reply(
        &self,
        request: &ReviewReplyRequest,
    ) -> Result<ReviewReplyResult, TaskError> {
        self.run_typed(TaskKind::ReviewReply, request).await
    }

    pub async fn summarize_performance(
        &self,
        request: &PerformanceNarrativeRequest,
    ) -> Result<PerformanceNarrativeResult, TaskError> {
        self.run_typed(TaskKind::PerformanceNarrative, request).await
    }

    pub async fn generate_product_image(
        &self,
        request: &ProductMediaRequest,
    ) -> Result<GeneratedMedia, TaskError> {
        self.run_media(TaskKind::ProductImage, request).await
    }

    pub async fn generate_product_video(
        &self,
        request: &ProductMediaRequest,
    ) -> Result<GeneratedMedia, TaskError> {
        self.run_media(TaskKind::ProductVideo, request).await
    }

    async fn run_typed<R, T>(&self, kind: TaskKind, request: &R) -> Result<T, TaskError>
    where
        R: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let input = to_input(request)?;
        self.run(kind, &input).await?.parse()
    }

    async fn run_media(
        &self,
        kind: TaskKind,
        request: &ProductMediaRequest,
    ) -> Result<GeneratedMedia, TaskError> {
        let input = to_input(request)?;
        let result = self
            .run_with(kind, &input, request.reference_image.as_ref(), None)
            .await?;
        GeneratedMedia::from_result(&result)
            .ok_or_else(|| TaskError::empty_result(format!("{kind} returned no media")))
    }
}

fn to_input<R: Serialize>(request: &R) -> Result<TaskInput, TaskError> {
    let value = serde_json::to_value(request).map_err(|err| {
        TaskError::precondition(format!("request could not be converted to task input: {err}"))
    })?;
    TaskInput::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_camel_case_input() {
        let input = to_input(&ListingOptimizerRequest {
            product_name: "Steel Bottle".to_string(),
            category: "Kitchen".to_string(),
            marketplace: "Amazon".to_string(),
            current_title: None,
            features: vec!["Leak proof".to_string()],
            keywords: vec![],
        })
        .unwrap();

        assert_eq!(input.get("productName"), Some(&json!("Steel Bottle")));
        assert_eq!(input.get("features"), Some(&json!(["Leak proof"])));
        assert!(input.get("currentTitle").is_none());
        assert!(input.get("keywords").is_none());
    }

    #[test]
    fn test_media_request_skips_reference_image() {
        let input = to_input(&ProductMediaRequest {
            product_name: "Silk Kurta".to_string(),
            scene_description: "Festive living room".to_string(),
            reference_image: Some(DataUri::from_bytes("image/png", b"png")),
            ..Default::default()
        })
        .unwrap();
        assert!(input.get("referenceImage").is_none());
        assert_eq!(input.as_map().len(), 2);
    }
}
