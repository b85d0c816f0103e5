//! Test helpers: scripted mock vision provider and request builders
//!
//! The mock binds an ephemeral port on 127.0.0.1 and serves the three
//! provider endpoints. It records every call so tests can assert exact call
//! counts.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use vb_bridge::services::build_http_client;
use vb_bridge::AppState;
use vb_common::config::{AzureCredentials, PollPolicy};

pub const TEST_KEY: &str = "test-subscription-key";
const BOUNDARY: &str = "vb-test-boundary";

/// How the mock answers a read submission
#[derive(Debug, Clone)]
pub enum SubmitBehavior {
    /// 202 with `operation-location: {base}/ops/123`
    Accept,
    /// 202 without the header
    NoLocation,
    /// Arbitrary error status and body
    Fail(u16, String),
}

/// Scripted provider responses
#[derive(Debug, Clone)]
pub struct Script {
    pub analyze_status: u16,
    pub analyze_body: String,
    pub submit: SubmitBehavior,
    /// One entry per status check; the last entry repeats once exhausted
    pub polls: Vec<(u16, String)>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            analyze_status: 200,
            analyze_body: r#"{"objects":[],"description":{"captions":[]}}"#.to_string(),
            submit: SubmitBehavior::Accept,
            polls: vec![(200, json!({ "status": "running" }).to_string())],
        }
    }
}

impl Script {
    pub fn analyze(status: u16, body: &str) -> Self {
        Self {
            analyze_status: status,
            analyze_body: body.to_string(),
            ..Self::default()
        }
    }

    /// Status checks answering each given JSON document with 200
    pub fn polls(docs: Vec<Value>) -> Self {
        Self {
            polls: docs.into_iter().map(|d| (200, d.to_string())).collect(),
            ..Self::default()
        }
    }
}

/// Request details recorded by the mock
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub analyze_query: Option<String>,
    pub analyze_key: Option<String>,
    pub analyze_content_type: Option<String>,
    pub analyze_body_len: usize,
    pub submit_key: Option<String>,
    pub submit_body_len: usize,
    pub poll_keys: Vec<Option<String>>,
}

struct MockState {
    base_url: String,
    script: Script,
    analyze_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    poll_calls: AtomicUsize,
    recorded: Mutex<Recorded>,
}

/// Running mock provider
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<MockState>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn json_response(status: u16, body: String) -> Response {
    (
        StatusCode::from_u16(status).unwrap(),
        [("content-type", "application/json")],
        body,
    )
        .into_response()
}

async fn mock_analyze(
    State(state): State<Arc<MockState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.analyze_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut rec = state.recorded.lock().unwrap();
        rec.analyze_query = query;
        rec.analyze_key = header_value(&headers, "ocp-apim-subscription-key");
        rec.analyze_content_type = header_value(&headers, "content-type");
        rec.analyze_body_len = body.len();
    }
    json_response(state.script.analyze_status, state.script.analyze_body.clone())
}

async fn mock_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.submit_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut rec = state.recorded.lock().unwrap();
        rec.submit_key = header_value(&headers, "ocp-apim-subscription-key");
        rec.submit_body_len = body.len();
    }
    match &state.script.submit {
        SubmitBehavior::Accept => (
            StatusCode::ACCEPTED,
            [(
                "operation-location",
                format!("{}/ops/123", state.base_url),
            )],
        )
            .into_response(),
        SubmitBehavior::NoLocation => StatusCode::ACCEPTED.into_response(),
        SubmitBehavior::Fail(status, body) => json_response(*status, body.clone()),
    }
}

async fn mock_poll(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let index = state.poll_calls.fetch_add(1, Ordering::SeqCst);
    state
        .recorded
        .lock()
        .unwrap()
        .poll_keys
        .push(header_value(&headers, "ocp-apim-subscription-key"));

    let polls = &state.script.polls;
    let (status, body) = polls[index.min(polls.len() - 1)].clone();
    json_response(status, body)
}

impl MockProvider {
    /// Bind an ephemeral port and start serving `script`
    pub async fn start(script: Script) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url,
            script,
            analyze_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/vision/v3.2/analyze", post(mock_analyze))
            .route("/vision/v3.2/read/analyze", post(mock_submit))
            .route("/ops/:id", get(mock_poll))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    pub fn analyze_calls(&self) -> usize {
        self.state.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.state.submit_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.state.poll_calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Recorded {
        self.state.recorded.lock().unwrap().clone()
    }

    pub fn credentials(&self) -> AzureCredentials {
        AzureCredentials::new(self.base_url(), TEST_KEY).unwrap()
    }

    /// App state pointing at this mock with a fast poll policy
    pub fn app_state(&self) -> AppState {
        self.app_state_with_policy(fast_policy())
    }

    pub fn app_state_with_policy(&self, policy: PollPolicy) -> AppState {
        AppState::new(build_http_client().unwrap(), Some(self.credentials()), policy)
    }
}

/// 30 attempts, 5 ms apart
pub fn fast_policy() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(5), 30).unwrap()
}

/// App state with no provider credentials
pub fn unconfigured_state() -> AppState {
    AppState::new(build_http_client().unwrap(), None, fast_policy())
}

/// Credentials for a port nothing listens on
pub async fn unreachable_credentials() -> AzureCredentials {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    AzureCredentials::new(format!("http://{}", addr), TEST_KEY).unwrap()
}

/// Fake JPEG of exactly `len` bytes (SOI marker, filler, EOI marker)
pub fn fake_jpeg(len: usize) -> Vec<u8> {
    assert!(len >= 4);
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(len - 2, 0x42);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// Build a multipart POST with optional `image` and `features` fields
pub fn multipart_request(uri: &str, image: Option<&[u8]>, features: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"test.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(features) = features {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"features\"\r\n\r\n{features}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Split a response into status, raw body bytes and parsed JSON (if any)
pub async fn read_response(response: Response) -> (StatusCode, Bytes, Option<Value>) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).ok();
    (status, bytes, json)
}
