//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! - Structured text: `models/{model}:generateContent` with a `responseSchema`.
//! - Images: an image-capable model, `responseModalities: ["TEXT", "IMAGE"]`.
//! - Video: `models/{model}:predictLongRunning` (Veo), polled via `GET /{operation}`.
//!
//! The key travels in the `x-goog-api-key` header rather than the URL.

use async_trait::async_trait;
use reqwest::Client;
use sellwise_core::config::{
    DEFAULT_GEMINI_IMAGE_MODEL, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VIDEO_MODEL, ModelSettings,
};
use sellwise_core::media::DataUri;
use sellwise_core::model::{
    Capability, Credential, GenerativeModel, MediaRequest, ModelError, OperationHandle,
    OperationStatus, StructuredRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http_error::{error_from_response, map_transport_error};

const PROVIDER: &str = "Gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
    video_model: String,
}

impl GeminiApiClient {
    /// Creates a client using `text_model` and the default media models.
    pub fn new(text_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            text_model: text_model.into(),
            image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_GEMINI_VIDEO_MODEL.to_string(),
        }
    }

    pub fn from_settings(settings: &ModelSettings) -> Self {
        let mut client = Self::new(settings.text_model.clone());
        if let Some(image_model) = &settings.image_model {
            client.image_model = image_model.clone();
        }
        if let Some(video_model) = &settings.video_model {
            client.video_model = video_model.clone();
        }
        client
    }

    /// Overrides the API root (e.g. a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        credential: &Credential,
        url: String,
        body: &B,
    ) -> Result<R, ModelError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, credential.expose())
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

    async fn download_video(
        &self,
        credential: &Credential,
        uri: &str,
    ) -> Result<DataUri, ModelError> {
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, credential.expose())
            .send()
            .await
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("video/"))
            .unwrap_or(VIDEO_MIME_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        tracing::debug!("[GeminiApiClient] Downloaded video ({} bytes)", bytes.len());
        Ok(DataUri::from_bytes(mime_type, &bytes))
    }
}

impl Default for GeminiApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_GEMINI_MODEL)
    }
}

#[async_trait]
impl GenerativeModel for GeminiApiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::Text | Capability::Image | Capability::Video
        )
    }

    async fn generate_structured(
        &self,
        credential: &Credential,
        request: StructuredRequest,
    ) -> Result<Option<String>, ModelError> {
        tracing::debug!(
            "[GeminiApiClient] generateContent model={} prompt_len={}",
            self.text_model,
            request.prompt.len()
        );

        let body = GenerateContentRequest {
            contents: vec![Content::user(build_parts(
                request.prompt,
                request.reference_image.as_ref(),
            ))],
            system_instruction: request.system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part::Text { text }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.response_shape.to_openapi_schema()),
                response_modalities: None,
            }),
        };

        let url = self.model_url(&self.text_model, "generateContent");
        let response: GenerateContentResponse = self.post_json(credential, url, &body).await?;
        Ok(extract_text(response))
    }

    async fn generate_image(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<Option<DataUri>, ModelError> {
        tracing::debug!(
            "[GeminiApiClient] image generateContent model={} with_reference={}",
            self.image_model,
            request.reference_image.is_some()
        );

        let body = GenerateContentRequest {
            contents: vec![Content::user(build_parts(
                request.prompt,
                request.reference_image.as_ref(),
            ))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        let url = self.model_url(&self.image_model, "generateContent");
        let response: GenerateContentResponse = self.post_json(credential, url, &body).await?;
        extract_image(response)
    }

    async fn start_video(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<OperationHandle, ModelError> {
        tracing::debug!(
            "[GeminiApiClient] predictLongRunning model={} with_reference={}",
            self.video_model,
            request.reference_image.is_some()
        );

        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt,
                image: request.reference_image.as_ref().map(|image| VideoImage {
                    bytes_base64_encoded: image.base64_data().to_string(),
                    mime_type: image.mime_type().to_string(),
                }),
            }],
        };

        let url = self.model_url(&self.video_model, "predictLongRunning");
        let operation: OperationResponse = self.post_json(credential, url, &body).await?;
        operation
            .name
            .map(OperationHandle::new)
            .ok_or_else(|| ModelError::new("Gemini API did not return an operation name"))
    }

    async fn poll_operation(
        &self,
        credential: &Credential,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, ModelError> {
        let url = format!("{}/{}", self.base_url, handle.as_str());
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, credential.expose())
            .send()
            .await
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let operation: OperationResponse = response.json().await.map_err(|err| {
            ModelError::new(format!(
                "Failed to parse {PROVIDER} operation: {}",
                err.without_url()
            ))
        })?;

        match interpret_operation(operation) {
            OperationOutcome::Pending => Ok(OperationStatus::Pending),
            OperationOutcome::Failed(message) => Ok(OperationStatus::Failed(message)),
            OperationOutcome::Finished(None) => Ok(OperationStatus::Done(None)),
            OperationOutcome::Finished(Some(uri)) => {
                let video = self.download_video(credential, &uri).await?;
                Ok(OperationStatus::Done(Some(video)))
            }
        }
    }
}

fn build_parts(prompt: String, reference_image: Option<&DataUri>) -> Vec<Part> {
    let mut parts = vec![Part::Text { text: prompt }];
    if let Some(image) = reference_image {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type().to_string(),
                data: image.base64_data().to_string(),
            },
        });
    }
    parts
}

fn candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}

fn extract_image(response: GenerateContentResponse) -> Result<Option<DataUri>, ModelError> {
    let Some(inline) = candidate_parts(response)
        .into_iter()
        .find_map(|part| part.inline_data)
    else {
        return Ok(None);
    };
    DataUri::from_base64(inline.mime_type, inline.data)
        .map(Some)
        .map_err(|err| ModelError::new(format!("Gemini API returned an unusable image: {err}")))
}

enum OperationOutcome {
    Pending,
    Failed(String),
    Finished(Option<String>),
}

fn interpret_operation(operation: OperationResponse) -> OperationOutcome {
    if let Some(error) = operation.error {
        return OperationOutcome::Failed(
            error
                .message
                .unwrap_or_else(|| "video generation failed".to_string()),
        );
    }
    if !operation.done.unwrap_or(false) {
        return OperationOutcome::Pending;
    }
    let uri = operation
        .response
        .and_then(|response| response.generate_video_response)
        .and_then(|video| video.generated_samples)
        .and_then(|samples| samples.into_iter().find_map(|sample| sample.video))
        .and_then(|video| video.uri);
    OperationOutcome::Finished(uri)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataPayload>,
}

#[derive(Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
}

#[derive(Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    name: Option<String>,
    done: Option<bool>,
    error: Option<OperationError>,
    response: Option<OperationResult>,
}

#[derive(Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    generated_samples: Option<Vec<GeneratedSample>>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Deserialize)]
struct VideoRef {
    uri: Option<String>,
}
