use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use taskline_core::StoreError;

/// Store errors surfaced over HTTP as `{"error": "..."}`.
pub struct ApiError(StoreError);

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self(StoreError::not_found(what))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self(StoreError::invalid(msg))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                tracing::error!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
