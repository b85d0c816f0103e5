//! Azure Computer Vision v3.2 client
//!
//! Three calls, all authenticated with `Ocp-Apim-Subscription-Key`:
//! - `POST {endpoint}/vision/v3.2/analyze?{param}=<list>`: synchronous analysis
//! - `POST {endpoint}/vision/v3.2/read/analyze`: submit a read (OCR) job
//! - `GET <operation-location>`: read job status
//!
//! No call is retried. Non-2xx responses are surfaced with the provider's
//! status code and raw body.

use axum::body::Bytes;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use vb_common::config::AzureCredentials;

use crate::models::{FeatureParam, FeatureSelection, ReadOperation};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const OPERATION_LOCATION_HEADER: &str = "operation-location";

const ANALYZE_PATH: &str = "/vision/v3.2/analyze";
const READ_ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";
const USER_AGENT: &str = concat!("vision-bridge/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which provider call produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStage {
    Analyze,
    Submit,
    Poll,
}

impl fmt::Display for ProviderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderStage::Analyze => "analyze",
            ProviderStage::Submit => "read submission",
            ProviderStage::Poll => "read status check",
        };
        f.write_str(name)
    }
}

/// Vision provider errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Network error during {stage}: {message}")]
    Network { stage: ProviderStage, message: String },

    #[error("Provider returned {status} during {stage}")]
    ProviderStatus {
        stage: ProviderStage,
        status: u16,
        body: String,
    },

    #[error("Provider accepted the read job but sent no operation-location header")]
    MissingOperationLocation,

    #[error("Malformed provider response during {stage}: {message}")]
    Contract { stage: ProviderStage, message: String },

    #[error("Read operation failed")]
    OperationFailed { detail: Option<Value> },

    #[error("Read operation still pending after {attempts} status checks")]
    TimedOut { attempts: u32, interval: Duration },
}

/// Opaque status URL returned by a read submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLocation(String);

impl OperationLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider JSON body, checked for well-formedness but never re-encoded
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderJson(Bytes);

impl ProviderJson {
    fn parse(stage: ProviderStage, body: Bytes) -> Result<Self, VisionError> {
        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
            VisionError::Contract {
                stage,
                message: e.to_string(),
            }
        })?;
        Ok(Self(body))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// One status-check response: the typed view plus the raw document
#[derive(Debug, Clone)]
pub struct ReadStatus {
    pub operation: ReadOperation,
    pub payload: ProviderJson,
}

/// Vision API client
///
/// Cheap to clone; the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http_client: reqwest::Client,
    credentials: AzureCredentials,
}

/// Shared HTTP client for all provider calls
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

impl VisionClient {
    pub fn new(http_client: reqwest::Client, credentials: AzureCredentials) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    /// Full analyze URL for a feature selection
    pub fn analyze_url(&self, param: FeatureParam, selection: &FeatureSelection) -> String {
        format!(
            "{}{}?{}={}",
            self.credentials.endpoint(),
            ANALYZE_PATH,
            param.as_str(),
            selection.to_query_value()
        )
    }

    pub fn read_submit_url(&self) -> String {
        format!("{}{}", self.credentials.endpoint(), READ_ANALYZE_PATH)
    }

    /// Synchronous image analysis
    pub async fn analyze(
        &self,
        image: Bytes,
        param: FeatureParam,
        selection: &FeatureSelection,
    ) -> Result<ProviderJson, VisionError> {
        let stage = ProviderStage::Analyze;
        let url = self.analyze_url(param, selection);

        tracing::debug!(
            features = %selection.to_query_value(),
            image_bytes = image.len(),
            "Calling vision analyze endpoint"
        );

        let response = self
            .http_client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, self.credentials.api_key())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| network(stage, e))?;

        let response = ensure_success(stage, response).await?;
        let body = response.bytes().await.map_err(|e| network(stage, e))?;
        ProviderJson::parse(stage, body)
    }

    /// Submit a read (OCR) job and return its status URL
    pub async fn submit_read(&self, image: Bytes) -> Result<OperationLocation, VisionError> {
        let stage = ProviderStage::Submit;

        tracing::debug!(image_bytes = image.len(), "Submitting read operation");

        let response = self
            .http_client
            .post(self.read_submit_url())
            .header(SUBSCRIPTION_KEY_HEADER, self.credentials.api_key())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| network(stage, e))?;

        let response = ensure_success(stage, response).await?;

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(OperationLocation::new)
            .ok_or(VisionError::MissingOperationLocation)
    }

    /// Fetch the current status of a read job
    pub async fn read_status(&self, location: &OperationLocation) -> Result<ReadStatus, VisionError> {
        let stage = ProviderStage::Poll;

        let response = self
            .http_client
            .get(location.as_str())
            .header(SUBSCRIPTION_KEY_HEADER, self.credentials.api_key())
            .send()
            .await
            .map_err(|e| network(stage, e))?;

        let response = ensure_success(stage, response).await?;
        let body = response.bytes().await.map_err(|e| network(stage, e))?;

        let operation: ReadOperation =
            serde_json::from_slice(&body).map_err(|e| VisionError::Contract {
                stage,
                message: e.to_string(),
            })?;

        Ok(ReadStatus {
            operation,
            payload: ProviderJson(body),
        })
    }
}

fn network(stage: ProviderStage, err: reqwest::Error) -> VisionError {
    VisionError::Network {
        stage,
        message: err.to_string(),
    }
}

async fn ensure_success(
    stage: ProviderStage,
    response: reqwest::Response,
) -> Result<reqwest::Response, VisionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(stage = %stage, error = %e, "Failed to read provider error body");
            String::new()
        }
    };
    tracing::error!(
        stage = %stage,
        status = status.as_u16(),
        body = %body,
        "Vision provider returned an error"
    );
    Err(VisionError::ProviderStatus {
        stage,
        status: status.as_u16(),
        body,
    })
}
