//! OCR via the asynchronous Read API

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Router,
};

use super::upload::read_upload;
use crate::error::ApiResult;
use crate::services::{ProviderJson, ReadPoller};
use crate::AppState;

/// POST /api/analyze-ocr
///
/// Submits the image, polls to completion and relays the final status
/// document (including `analyzeResult`) unchanged.
pub async fn analyze_ocr(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ProviderJson> {
    let upload = read_upload(multipart).await?;
    let client = state.vision_client()?;

    let outcome = ReadPoller::new(client, state.poll_policy)
        .run(upload.image)
        .await?;

    tracing::info!(
        attempts = outcome.attempts,
        lines = outcome.operation.lines().len(),
        "OCR complete"
    );
    Ok(outcome.payload)
}

/// Build OCR routes
pub fn ocr_routes() -> Router<AppState> {
    Router::new().route("/api/analyze-ocr", post(analyze_ocr))
}
