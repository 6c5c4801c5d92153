#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use submission_core::{
    create_app,
    mail::{DispatchReceipt, MailDispatcher, MailError, MailMessage, TransportMode},
    AppConfig, AppState, ManualClock, SharedDispatcher,
};
use tower::ServiceExt;

pub const NOW: i64 = 1_760_000_000_000;
pub const BOUNDARY: &str = "X-SUBMISSION-TEST-BOUNDARY";

#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailDispatcher for RecordingDispatcher {
    async fn dispatch(&self, message: MailMessage) -> Result<DispatchReceipt, MailError> {
        self.sent.lock().push(message);
        Ok(DispatchReceipt::Sent {
            provider_id: Some("test-id".to_string()),
        })
    }

    fn mode(&self) -> TransportMode {
        TransportMode::Api
    }
}

/// Never finishes within any sane dispatch timeout.
pub struct StalledDispatcher;

#[async_trait]
impl MailDispatcher for StalledDispatcher {
    async fn dispatch(&self, _message: MailMessage) -> Result<DispatchReceipt, MailError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(DispatchReceipt::Logged)
    }

    fn mode(&self) -> TransportMode {
        TransportMode::Api
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub dispatcher: RecordingDispatcher,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let dispatcher = RecordingDispatcher::default();
        Self::with_dispatcher(config, Arc::new(dispatcher.clone()), dispatcher)
    }

    pub fn with_dispatcher(
        config: AppConfig,
        shared: SharedDispatcher,
        dispatcher: RecordingDispatcher,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(NOW));
        let state = AppState::new(config, shared, clock.clone());
        let router = create_app(state.clone());

        Self {
            router,
            state,
            clock,
            dispatcher,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn contact_payload(rendered_at: i64) -> Value {
    serde_json::json!({
        "name": "Test User",
        "email": "test@example.com",
        "company": "Acme",
        "message": "This is a test message for the contact form.",
        "website": "",
        "timestamp": rendered_at,
    })
}

pub fn contact_request(payload: &Value, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.bytes
    }
}

pub fn application(rendered_at: i64) -> MultipartBody {
    MultipartBody::new()
        .text("firstName", "Ada")
        .text("lastName", "Lovelace")
        .text("email", "ada@example.com")
        .text("message", "I would love to work on your backend.")
        .text("jobId", "senior-backend-engineer")
        .text("jobTitle", "Senior Backend Engineer")
        .text("website", "")
        .text("timestamp", &rendered_at.to_string())
}

pub fn careers_request(body: Vec<u8>, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/careers")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("x-forwarded-for", client)
        .body(Body::from(body))
        .unwrap()
}
