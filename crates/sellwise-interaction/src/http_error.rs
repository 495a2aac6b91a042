//! HTTP error mapping shared by the provider clients.

use reqwest::{StatusCode, header::HeaderValue};
use sellwise_core::model::ModelError;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    /// Gemini: `RESOURCE_EXHAUSTED`, `INVALID_ARGUMENT`, ...
    status: Option<String>,
    /// OpenAI: `insufficient_quota`, `invalid_request_error`, ...
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Builds a [`ModelError`] from a non-success response.
pub(crate) fn map_http_error(
    provider: &str,
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ModelError {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let label = wrapper.error.status.or(wrapper.error.kind).unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if label.is_empty() {
                msg
            } else {
                format!("{label}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());

    let mut message = format!("{provider} API returned {status}: {detail}");
    if let Some(delay) = retry_after {
        message.push_str(&format!(" (retry after {}s)", delay.as_secs()));
    }

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ModelError::with_status(status.as_u16(), message, is_retryable)
}

/// Maps a transport-level failure (DNS, TLS, timeout, body decode).
pub(crate) fn map_transport_error(provider: &str, err: reqwest::Error) -> ModelError {
    let status_code = err.status().map(|s| s.as_u16());
    let is_retryable = err.is_connect() || err.is_timeout();
    ModelError {
        status_code,
        // without_url keeps query strings out of user-visible messages
        message: format!("{provider} API request failed: {}", err.without_url()),
        is_retryable,
    }
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Reads an error response and maps it.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ModelError {
    let status = response.status();
    let retry_after = parse_retry_after(response.headers().get("retry-after"));
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| format!("Failed to read {provider} error body"));
    map_http_error(provider, status, &body, retry_after)
}
