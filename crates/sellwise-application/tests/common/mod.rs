#![allow(dead_code)]

use async_trait::async_trait;
use sellwise_application::{AdapterState, InvocationObserver, Sleeper};
use sellwise_core::media::DataUri;
use sellwise_core::model::{
    Capability, Credential, GenerativeModel, MediaRequest, ModelError, OperationHandle,
    OperationStatus, StructuredRequest,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted model that counts every outbound call.
pub struct MockModel {
    structured_reply: Result<Option<String>, ModelError>,
    image_reply: Result<Option<DataUri>, ModelError>,
    poll_script: Mutex<VecDeque<Result<OperationStatus, ModelError>>>,
    capabilities: Vec<Capability>,
    pub structured_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub structured_requests: Mutex<Vec<StructuredRequest>>,
    pub media_requests: Mutex<Vec<MediaRequest>>,
    pub credentials_seen: Mutex<Vec<String>>,
}

impl MockModel {
    fn with_reply(reply: Result<Option<String>, ModelError>) -> Self {
        Self {
            structured_reply: reply,
            image_reply: Ok(Some(png())),
            poll_script: Mutex::new(VecDeque::new()),
            capabilities: vec![Capability::Text, Capability::Image, Capability::Video],
            structured_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            structured_requests: Mutex::new(Vec::new()),
            media_requests: Mutex::new(Vec::new()),
            credentials_seen: Mutex::new(Vec::new()),
        }
    }

    /// Answers every structured call with `value` serialized as JSON.
    pub fn replying(value: Value) -> Self {
        Self::with_reply(Ok(Some(value.to_string())))
    }

    pub fn replying_text(text: &str) -> Self {
        Self::with_reply(Ok(Some(text.to_string())))
    }

    pub fn without_text() -> Self {
        Self::with_reply(Ok(None))
    }

    pub fn failing(error: ModelError) -> Self {
        Self::with_reply(Err(error))
    }

    pub fn with_image(mut self, image: Option<DataUri>) -> Self {
        self.image_reply = Ok(image);
        self
    }

    pub fn with_polls(self, script: Vec<Result<OperationStatus, ModelError>>) -> Self {
        *self.poll_script.lock().unwrap() = script.into();
        self
    }

    pub fn text_only(mut self) -> Self {
        self.capabilities = vec![Capability::Text];
        self
    }

    pub fn total_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
            + self.image_calls.load(Ordering::SeqCst)
            + self.video_calls.load(Ordering::SeqCst)
            + self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn structured(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    fn record_credential(&self, credential: &Credential) {
        self.credentials_seen
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    fn provider(&self) -> &str {
        "mock"
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    async fn generate_structured(
        &self,
        credential: &Credential,
        request: StructuredRequest,
    ) -> Result<Option<String>, ModelError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.record_credential(credential);
        self.structured_requests.lock().unwrap().push(request);
        self.structured_reply.clone()
    }

    async fn generate_image(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<Option<DataUri>, ModelError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.record_credential(credential);
        self.media_requests.lock().unwrap().push(request);
        self.image_reply.clone()
    }

    async fn start_video(
        &self,
        credential: &Credential,
        request: MediaRequest,
    ) -> Result<OperationHandle, ModelError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.record_credential(credential);
        self.media_requests.lock().unwrap().push(request);
        Ok(OperationHandle::new("operations/mock-video"))
    }

    async fn poll_operation(
        &self,
        _credential: &Credential,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, ModelError> {
        assert_eq!(handle.as_str(), "operations/mock-video");
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OperationStatus::Pending))
    }
}

/// Records requested sleeps without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<AdapterState>>,
}

impl InvocationObserver for RecordingObserver {
    fn on_transition(&self, _task: &str, state: AdapterState) {
        self.states.lock().unwrap().push(state);
    }
}

pub fn key() -> Option<Credential> {
    Some(Credential::new("test-key"))
}

pub fn png() -> DataUri {
    DataUri::from_bytes("image/png", b"\x89PNG generated")
}

pub fn mp4() -> DataUri {
    DataUri::from_bytes("video/mp4", b"mp4 generated")
}
