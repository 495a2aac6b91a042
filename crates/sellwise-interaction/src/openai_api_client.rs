//! OpenAIApiClient - Direct REST API implementation for OpenAI.
//!
//! Structured output goes through Chat Completions with a `json_schema`
//! response format; images through `images/generations`. OpenAI has no
//! video endpoint here, so [`Capability::Video`] is unsupported.

use async_trait::async_trait;
use reqwest::Client;
use sellwise_core::config::{DEFAULT_OPENAI_IMAGE_MODEL, DEFAULT_OPENAI_MODEL, ModelSettings};
use sellwise_core::media::DataUri;
use sellwise_core::model::{
    Capability, Credential, GenerativeModel, MediaRequest, ModelError, OperationHandle,
    OperationStatus, StructuredRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http_error::{error_from_response, map_transport_error};

const PROVIDER: &str = "OpenAI";
const BASE_URL: &str = "https://api.openai.com/v1";
const IMAGE_MIME_TYPE: &str = "image/png";

/// Client for the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAIApiClient {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl OpenAIApiClient {
    pub fn new(text_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            text_model: text_model.into(),
            image_model: DEFAULT_OPENAI_IMAGE_MODEL.to_string(),
        }
    }

    pub fn from_settings(settings: &ModelSettings) -> Self {
        let mut client = Self::new(settings.text_model.clone());
        if let Some(image_model) = &settings.image_model {
            client.image_model = image_model.clone();
        }
        client
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        credential: &Credential,
        endpoint: &str,
        body: &B,
    ) -> Result<R, ModelError> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        response.json::<R>().await.map_err(|err| {
            ModelError::new(format!("Failed to parse {PROVIDER} response: {}", err.without_url()))
        })
    }

    /// `dall-e-*` models answer with URLs unless asked for base64;
    /// `gpt-image-*` always return base64 and reject the parameter.
    fn image_request(&self, prompt: String) -> ImageGenerationRequest {
        let response_format = self.image_model.starts_with("dall-e").then_some("b64_json");
        ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt,
            n: 1,
            response_format,
        }
    }

    fn chat_request(&self, request: StructuredRequest) -> ChatCompletionRequest {
        let mut messages = Vec::new();
        if let Some(system) = request.system_instruction {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: vec![MessageContent::Text { text: system }],
            });
        }

        let mut content = vec![MessageContent::Text {
            text: request.prompt,
        }];
        if let Some(image) = request.reference_image {
            content.push(MessageContent::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_string(),
                },
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content,
        });

        ChatCompletionRequest {
            model: self.text_model.clone(),
            messages,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    strict: false,
                    schema: request.response_shape.to_json_schema(),
                },
            },
        }
    }
}

impl Default for OpenAIApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_OPENAI_MODEL)
    }
}

#[async_trait]
impl GenerativeModel for OpenAIApiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::Text | Capability::Image)
    }

    async fn generate_structured(
        &self,
        credential: &Credential,
        request: StructuredRequest,
    ) -> Result<Option<String>, ModelError> {
        tracing::debug!(
            "[OpenAIApiClient] chat/completions model={} schema={}",
            self.text_model,
            request.schema_name
        );
        let body = self.chat_request(request);
        let response: ChatCompletionResponse =
            self.post_json(credential, "chat/completions", &body).await?;
        Ok(extract_text(response))
    }

    async fn generate_image(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<Option<DataUri>, ModelError> {
        if request.reference_image.is_some() {
            tracing::warn!(
                "[OpenAIApiClient] images/generations does not accept a reference image; ignoring it"
            );
        }
        let body = self.image_request(request.prompt);
        let response: ImageGenerationResponse =
            self.post_json(credential, "images/generations", &body).await?;
        extract_image(response)
    }

    async fn start_video(
        &self,
        _credential: &Credential,
        _request: MediaRequest,
    ) -> Result<OperationHandle, ModelError> {
        Err(ModelError::new("OpenAI does not support video generation"))
    }

    async fn poll_operation(
        &self,
        _credential: &Credential,
        _handle: &OperationHandle,
    ) -> Result<OperationStatus, ModelError> {
        Err(ModelError::new("OpenAI does not support long-running operations"))
    }
}

fn extract_text(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
}

fn extract_image(response: ImageGenerationResponse) -> Result<Option<DataUri>, ModelError> {
    let Some(data) = response.data.into_iter().find_map(|image| image.b64_json) else {
        return Ok(None);
    };
    DataUri::from_base64(IMAGE_MIME_TYPE, data)
        .map(Some)
        .map_err(|err| ModelError::new(format!("OpenAI API returned an unusable image: {err}")))
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<MessageContent>,
}

enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl Serialize for MessageContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        match self {
            MessageContent::Text { text } => {
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", text)?;
            }
            MessageContent::ImageUrl { image_url } => {
                map.serialize_entry("type", "image_url")?;
                map.serialize_entry("image_url", image_url)?;
            }
        }
        map.end()
    }
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    b64_json: Option<String>,
}
