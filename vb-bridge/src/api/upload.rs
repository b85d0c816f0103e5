//! Multipart image ingestion

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

/// Form field carrying the image bytes
pub const IMAGE_FIELD: &str = "image";

/// Form field carrying the comma-joined feature list
pub const FEATURES_FIELD: &str = "features";

/// Fields extracted from an analysis form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub image: Bytes,
    /// Raw `features` value; `None` when the field is absent
    pub features: Option<String>,
}

/// Read the `image` (and optional `features`) fields, ignoring anything else
///
/// Takes the extractor result so that a non-multipart body or a missing
/// boundary is reported like any other bad upload.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ImageUpload> {
    let mut multipart = multipart
        .map_err(|e| ApiError::BadRequest(format!("Expected a multipart/form-data upload: {}", e)))?;
    let mut image = None;
    let mut file_name = None;
    let mut features = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            IMAGE_FIELD => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some(bytes);
            }
            FEATURES_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read features: {}", e)))?;
                features = Some(text);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| {
        ApiError::BadRequest("Missing image file in form field 'image'".to_string())
    })?;
    if image.is_empty() {
        return Err(ApiError::BadRequest("Uploaded image is empty".to_string()));
    }

    tracing::debug!(
        image_bytes = image.len(),
        file_name = file_name.as_deref().unwrap_or("-"),
        "Image upload received"
    );

    Ok(ImageUpload { image, features })
}
