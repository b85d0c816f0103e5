//! Error types for vb-bridge
//!
//! Every failure class maps to a distinct `code` in the JSON body, so callers
//! never have to rely on the HTTP status alone:
//!
//! ```json
//! { "error": "<message>", "code": "<CODE>", "details": <optional> }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::{ProviderStage, VisionError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Provider credentials not configured (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any failure talking to the vision provider
    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Vision(err) => match err {
                VisionError::ProviderStatus { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                VisionError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
                VisionError::Network { .. }
                | VisionError::MissingOperationLocation
                | VisionError::Contract { .. }
                | VisionError::OperationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Vision(err) => match err {
                VisionError::ProviderStatus { stage, .. } => match stage {
                    ProviderStage::Analyze => "PROVIDER_ANALYZE_ERROR",
                    ProviderStage::Submit => "PROVIDER_SUBMIT_ERROR",
                    ProviderStage::Poll => "PROVIDER_POLL_ERROR",
                },
                VisionError::Network { .. } => "PROVIDER_UNREACHABLE",
                VisionError::MissingOperationLocation => "MISSING_OPERATION_LOCATION",
                VisionError::Contract { .. } => "PROVIDER_CONTRACT_VIOLATION",
                VisionError::OperationFailed { .. } => "READ_OPERATION_FAILED",
                VisionError::TimedOut { .. } => "READ_TIMEOUT",
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Config(msg) => msg.clone(),
            ApiError::Vision(err) => match err {
                VisionError::ProviderStatus { stage, .. } => match stage {
                    ProviderStage::Analyze => "Vision API analyze request failed".to_string(),
                    ProviderStage::Submit => "Failed to submit image to the Read API".to_string(),
                    ProviderStage::Poll => "Failed to check Read operation status".to_string(),
                },
                VisionError::Network { stage, .. } => {
                    format!("Vision provider unreachable during {}", stage)
                }
                VisionError::MissingOperationLocation => {
                    "Read API did not return an operation-location header".to_string()
                }
                VisionError::Contract { stage, .. } => {
                    format!("Malformed vision provider response during {}", stage)
                }
                VisionError::OperationFailed { .. } => "Read operation failed".to_string(),
                VisionError::TimedOut { .. } => {
                    "Timed out waiting for Read operation results".to_string()
                }
            },
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::BadRequest(_) | ApiError::Config(_) => None,
            ApiError::Vision(err) => match err {
                VisionError::ProviderStatus { body, .. } => Some(Value::String(body.clone())),
                VisionError::Network { message, .. } | VisionError::Contract { message, .. } => {
                    Some(Value::String(message.clone()))
                }
                VisionError::MissingOperationLocation => None,
                VisionError::OperationFailed { detail } => detail.clone(),
                VisionError::TimedOut { attempts, interval } => Some(json!({
                    "attempts": attempts,
                    "interval_ms": interval.as_millis() as u64,
                })),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(code, status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(code, status = status.as_u16(), "{}", self);
        }

        let mut body = json!({
            "error": self.message(),
            "code": code,
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::time::Duration;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_shape() {
        let (status, body) = body_json(ApiError::BadRequest("no image".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["error"], "no image");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_provider_status_is_relayed() {
        let err = ApiError::from(VisionError::ProviderStatus {
            stage: ProviderStage::Analyze,
            status: 401,
            body: "Access denied".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "PROVIDER_ANALYZE_ERROR");
        assert_eq!(body["details"], "Access denied");
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout() {
        let err = ApiError::from(VisionError::TimedOut {
            attempts: 30,
            interval: Duration::from_millis(1000),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["code"], "READ_TIMEOUT");
        assert_eq!(body["details"]["attempts"], 30);
        assert_eq!(body["details"]["interval_ms"], 1000);
    }

    #[test]
    fn test_failure_classes_have_distinct_codes() {
        let errors = vec![
            ApiError::BadRequest("x".into()),
            ApiError::Config("x".into()),
            VisionError::ProviderStatus { stage: ProviderStage::Analyze, status: 500, body: String::new() }.into(),
            VisionError::ProviderStatus { stage: ProviderStage::Submit, status: 500, body: String::new() }.into(),
            VisionError::ProviderStatus { stage: ProviderStage::Poll, status: 500, body: String::new() }.into(),
            VisionError::Network { stage: ProviderStage::Poll, message: String::new() }.into(),
            VisionError::MissingOperationLocation.into(),
            VisionError::Contract { stage: ProviderStage::Poll, message: String::new() }.into(),
            VisionError::OperationFailed { detail: None }.into(),
            VisionError::TimedOut { attempts: 1, interval: Duration::ZERO }.into(),
        ];
        let mut codes: Vec<&str> = errors.iter().map(ApiError::code).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_out_of_range_provider_status_falls_back_to_bad_gateway() {
        let err = ApiError::from(VisionError::ProviderStatus {
            stage: ProviderStage::Poll,
            status: 42,
            body: String::new(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
