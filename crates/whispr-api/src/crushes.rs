use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use whispr_types::api::SendCrushRequest;

use crate::caller::CallerId;
use crate::error::ApiError;
use crate::state::AppState;

/// Crushes are private: callers only ever see their own.
pub async fn list_crushes(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
) -> impl IntoResponse {
    Json(state.whispr.list_crushes(&caller).await)
}

pub async fn send_crush(
    State(state): State<AppState>,
    Json(req): Json<SendCrushRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let crush = state.whispr.send_crush(req).await?;
    Ok((StatusCode::CREATED, Json(crush)))
}

pub async fn reveal_crush(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let crush = state.whispr.reveal_crush(id, &caller).await?;
    Ok(Json(crush))
}

pub async fn delete_crush(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    state.whispr.delete_crush(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
