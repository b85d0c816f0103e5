//! Immediate image analysis
//!
//! One upload, one provider call, response relayed as-is.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Router,
};

use super::upload::read_upload;
use crate::error::{ApiError, ApiResult};
use crate::models::{FeatureParam, FeatureSelection, VisualFeature};
use crate::services::ProviderJson;
use crate::AppState;

/// POST /api/analyze
///
/// Fixed `Objects,Description` selection sent as `visualFeatures`.
pub async fn analyze_default(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ProviderJson> {
    let upload = read_upload(multipart).await?;
    let selection = FeatureSelection::new([VisualFeature::Objects, VisualFeature::Description]);
    run_analysis(&state, upload.image, FeatureParam::VisualFeatures, selection).await
}

/// POST /api/analyze-features
///
/// Caller-selected features from the `features` form field (absent means none).
pub async fn analyze_features(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ProviderJson> {
    let upload = read_upload(multipart).await?;
    let selection = FeatureSelection::parse_list(upload.features.as_deref().unwrap_or(""))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    run_analysis(&state, upload.image, FeatureParam::Features, selection).await
}

async fn run_analysis(
    state: &AppState,
    image: axum::body::Bytes,
    param: FeatureParam,
    selection: FeatureSelection,
) -> ApiResult<ProviderJson> {
    let client = state.vision_client()?;
    let result = client.analyze(image, param, &selection).await?;

    tracing::info!(
        features = %selection.to_query_value(),
        response_bytes = result.as_bytes().len(),
        "Image analysis complete"
    );
    Ok(result)
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze_default))
        .route("/api/analyze-features", post(analyze_features))
}
