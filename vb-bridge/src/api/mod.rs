//! HTTP API handlers for vb-bridge

pub mod analyze;
pub mod health;
pub mod ocr;
pub mod ui;
pub mod upload;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use ocr::ocr_routes;
pub use ui::ui_routes;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::services::ProviderJson;

impl IntoResponse for ProviderJson {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            self.into_bytes(),
        )
            .into_response()
    }
}
