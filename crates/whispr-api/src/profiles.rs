use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use whispr_types::api::{ProfileResponse, UpdateProfileRequest};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_profile(State(state): State<AppState>) -> impl IntoResponse {
    let profile = state.whispr.create_profile().await;
    (StatusCode::CREATED, Json(ProfileResponse::from(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.whispr.get_profile(&id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// The path id doubles as the bearer token; only its holder knows it.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.whispr.update_profile(&id, req).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn regenerate_alias(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.whispr.regenerate_alias(&id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}
