//! vb-bridge library interface
//!
//! Relays image uploads to the Azure Computer Vision API:
//! - immediate analysis (`/api/analyze`, `/api/analyze-features`)
//! - OCR via submit-and-poll (`/api/analyze-ocr`)

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;
use vb_common::config::{AzureCredentials, PollPolicy};

use crate::services::VisionClient;

/// Largest accepted upload; matches the provider's 20 MB image limit
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
///
/// Immutable after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Provider client, or `None` when credentials are missing
    pub vision: Option<VisionClient>,
    /// OCR polling policy
    pub poll_policy: PollPolicy,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        http_client: reqwest::Client,
        credentials: Option<AzureCredentials>,
        poll_policy: PollPolicy,
    ) -> Self {
        Self {
            vision: credentials.map(|c| VisionClient::new(http_client, c)),
            poll_policy,
            startup_time: Utc::now(),
        }
    }

    /// Provider client, or a configuration error if credentials are missing
    pub fn vision_client(&self) -> ApiResult<&VisionClient> {
        self.vision.as_ref().ok_or_else(|| {
            ApiError::Config(
                "Azure endpoint or API key is not configured (set AZURE_ENDPOINT and AZURE_API_KEY)"
                    .to_string(),
            )
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::analyze_routes())
        .merge(api::ocr_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
