//! The generative task adapter.
//!
//! One [`TaskAdapter`] wraps one [`TaskDefinition`] and turns a [`TaskInput`]
//! into a validated [`TaskResult`]:
//!
//! ```text
//! Validating -> Prompting -> AwaitingModel -> (Polling)* -> Validated | Failed
//! ```
//!
//! Nothing is retried or cached; every call goes to the model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sellwise_core::error::TaskError;
use sellwise_core::media::DataUri;
use sellwise_core::model::{
    Capability, Credential, GenerativeModel, MediaRequest, StructuredRequest,
};
use sellwise_core::shape::Shape;
use sellwise_core::task::{TaskInput, TaskSpec};
use sellwise_core::template::PromptTemplate;
use std::sync::Arc;
use strum::{Display, IntoStaticStr};
use uuid::Uuid;

use crate::credentials::CredentialResolver;
use crate::polling::{PollPolicy, Sleeper, TokioSleeper, poll_operation};

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum AdapterState {
    Validating,
    Prompting,
    AwaitingModel,
    Polling,
    Validated,
    Failed,
}

impl AdapterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdapterState::Validated | AdapterState::Failed)
    }
}

/// Receives every state an invocation enters, in order.
pub trait InvocationObserver: Send + Sync {
    fn on_transition(&self, task: &str, state: AdapterState);
}

/// Second generation stage fed by a field of the validated first-stage output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStage {
    Image { prompt_field: &'static str },
    Video { prompt_field: &'static str },
}

impl MediaStage {
    pub fn capability(&self) -> Capability {
        match self {
            MediaStage::Image { .. } => Capability::Image,
            MediaStage::Video { .. } => Capability::Video,
        }
    }

    pub fn prompt_field(&self) -> &'static str {
        match self {
            MediaStage::Image { prompt_field } | MediaStage::Video { prompt_field } => {
                prompt_field
            }
        }
    }
}

/// Everything fixed about one task kind.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    pub spec: TaskSpec,
    pub template: PromptTemplate,
    pub system_instruction: Option<String>,
    pub output: Shape,
    pub media: Option<MediaStage>,
}

impl TaskDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        spec_fields: Vec<sellwise_core::task::InputField>,
        template: impl Into<String>,
        output: Shape,
    ) -> Self {
        let name = name.into();
        Self {
            spec: TaskSpec::new(name.clone(), spec_fields),
            template: PromptTemplate::new(name.clone(), template),
            name,
            description: description.into(),
            system_instruction: None,
            output,
            media: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_media(mut self, stage: MediaStage) -> Self {
        self.media = Some(stage);
        self
    }

    /// Response-schema name sent to providers that require one.
    pub fn schema_name(&self) -> String {
        self.name.replace('-', "_")
    }
}

/// A validated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<DataUri>,
}

impl TaskResult {
    /// Deserializes the validated data into a typed result.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, TaskError> {
        serde_json::from_value(self.data.clone()).map_err(|err| {
            TaskError::shape(
                "$",
                format!("validated output does not fit `{}`: {err}", self.task),
            )
        })
    }
}

/// Runs one task kind against a model.
#[derive(Clone)]
pub struct TaskAdapter {
    definition: Arc<TaskDefinition>,
    model: Arc<dyn GenerativeModel>,
    resolver: Option<Arc<dyn CredentialResolver>>,
    observer: Option<Arc<dyn InvocationObserver>>,
    poll_policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl TaskAdapter {
    pub fn new(definition: Arc<TaskDefinition>, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            definition,
            model,
            resolver: None,
            observer: None,
            poll_policy: PollPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
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

    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    pub async fn run(
        &self,
        input: &TaskInput,
        credential: Option<Credential>,
    ) -> Result<TaskResult, TaskError> {
        self.run_with_reference(input, None, credential).await
    }

    /// Runs the task with an optional reference image for multimodal prompts.
    pub async fn run_with_reference(
        &self,
        input: &TaskInput,
        reference_image: Option<&DataUri>,
        credential: Option<Credential>,
    ) -> Result<TaskResult, TaskError> {
        let invocation = Invocation {
            id: Uuid::new_v4(),
            task: &self.definition.name,
            observer: self.observer.as_deref(),
        };
        tracing::info!(
            "[TaskAdapter] {} started ({}, provider: {})",
            invocation.task,
            invocation.id,
            self.model.provider()
        );

        let outcome = self
            .execute(&invocation, input, reference_image, credential)
            .await;

        match &outcome {
            Ok(result) => {
                invocation.enter(AdapterState::Validated);
                tracing::info!(
                    "[TaskAdapter] {} finished ({}, media: {})",
                    invocation.task,
                    invocation.id,
                    result.media.as_ref().map_or("none", |m| m.mime_type())
                );
            }
            Err(err) => {
                invocation.enter(AdapterState::Failed);
                tracing::warn!(
                    "[TaskAdapter] {} failed ({}) [{}]: {}",
                    invocation.task,
                    invocation.id,
                    err.kind(),
                    err
                );
            }
        }
        outcome
    }

    async fn execute(
        &self,
        invocation: &Invocation<'_>,
        input: &TaskInput,
        reference_image: Option<&DataUri>,
        credential: Option<Credential>,
    ) -> Result<TaskResult, TaskError> {
        let definition = &*self.definition;

        invocation.enter(AdapterState::Validating);
        let credential = self.resolve_credential(credential).await?;
        definition.spec.validate(input)?;
        self.ensure_supported(Capability::Text)?;
        if let Some(stage) = definition.media {
            self.ensure_supported(stage.capability())?;
        }

        invocation.enter(AdapterState::Prompting);
        let prompt = definition.template.render(input)?;
        tracing::debug!(
            "[TaskAdapter] {} prompt rendered ({} chars)",
            invocation.task,
            prompt.len()
        );

        invocation.enter(AdapterState::AwaitingModel);
        let request = StructuredRequest {
            prompt,
            system_instruction: definition.system_instruction.clone(),
            reference_image: reference_image.cloned(),
            schema_name: definition.schema_name(),
            response_shape: definition.output.clone(),
        };
        let text = self
            .model
            .generate_structured(&credential, request)
            .await?
            .ok_or_else(|| TaskError::empty_result("the model returned no text"))?;

        let data = parse_reply(&text, &definition.output)?;

        let media = match definition.media {
            None => None,
            Some(stage) => {
                let media_prompt = stage_prompt(&data, stage.prompt_field())?;
                let request = MediaRequest {
                    prompt: media_prompt,
                    reference_image: reference_image.cloned(),
                };
                Some(self.generate_media(invocation, stage, &credential, request).await?)
            }
        };

        Ok(TaskResult {
            task: definition.name.clone(),
            data,
            media,
        })
    }

    async fn generate_media(
        &self,
        invocation: &Invocation<'_>,
        stage: MediaStage,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<DataUri, TaskError> {
        match stage {
            MediaStage::Image { .. } => self
                .model
                .generate_image(credential, request)
                .await?
                .ok_or_else(|| TaskError::empty_result("no generated image found in the response")),
            MediaStage::Video { .. } => {
                let handle = self.model.start_video(credential, request).await?;
                tracing::debug!(
                    "[TaskAdapter] {} started operation {}",
                    invocation.task,
                    handle.as_str()
                );
                invocation.enter(AdapterState::Polling);
                poll_operation(
                    self.model.as_ref(),
                    credential,
                    &handle,
                    &self.poll_policy,
                    self.sleeper.as_ref(),
                )
                .await
            }
        }
    }

    async fn resolve_credential(
        &self,
        explicit: Option<Credential>,
    ) -> Result<Credential, TaskError> {
        let resolved = match explicit {
            Some(credential) => Some(credential),
            None => match &self.resolver {
                Some(resolver) => resolver.resolve().await,
                None => None,
            },
        };
        resolved.filter(|credential| !credential.is_blank()).ok_or_else(|| {
            TaskError::precondition(format!(
                "no API key configured for {}",
                self.model.provider()
            ))
        })
    }

    fn ensure_supported(&self, capability: Capability) -> Result<(), TaskError> {
        if self.model.supports(capability) {
            Ok(())
        } else {
            Err(TaskError::precondition(format!(
                "provider {} cannot generate {capability} output",
                self.model.provider()
            )))
        }
    }
}

struct Invocation<'a> {
    id: Uuid,
    task: &'a str,
    observer: Option<&'a dyn InvocationObserver>,
}

impl Invocation<'_> {
    fn enter(&self, state: AdapterState) {
        tracing::debug!("[TaskAdapter] {} ({}) -> {}", self.task, self.id, state);
        if let Some(observer) = self.observer {
            observer.on_transition(self.task, state);
        }
    }
}

/// Parses model text as JSON and validates it against `shape`.
///
/// A surrounding Markdown code fence is tolerated.
pub fn parse_reply(text: &str, shape: &Shape) -> Result<Value, TaskError> {
    let value: Value = serde_json::from_str(strip_code_fence(text)).map_err(|err| {
        TaskError::shape("$", format!("the model reply is not valid JSON: {err}"))
    })?;
    shape
        .validate(&value)
        .map_err(|violation| TaskError::shape(violation.path, violation.reason))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn stage_prompt(data: &Value, field: &str) -> Result<String, TaskError> {
    let prompt = data
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if prompt.is_empty() {
        return Err(TaskError::empty_result(format!(
            "the model returned no `{field}` to generate media from"
        )));
    }
    Ok(prompt.to_string())
}
