use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use whispr_store::StoreError;
use whispr_types::api::ErrorBody;

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    MissingCaller,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingCaller => (StatusCode::BAD_REQUEST, "missing caller id".to_string()),
            ApiError::Store(StoreError::Invalid(reason)) => (StatusCode::BAD_REQUEST, reason.to_string()),
            ApiError::Store(StoreError::NotFound) => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::Store(StoreError::Persistence(e)) => {
                error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable".to_string())
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
