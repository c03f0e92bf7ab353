use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use whispr_store::content::ConfessionQuery;
use whispr_types::api::{
    CreateConfessionRequest, ListConfessionsQuery, ToggleReactionRequest, ToggleReactionResponse,
};

use crate::caller::CallerId;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_confessions(
    State(state): State<AppState>,
    Query(query): Query<ListConfessionsQuery>,
) -> impl IntoResponse {
    let confessions = state.whispr.list_confessions(ConfessionQuery::from(query)).await;
    Json(confessions)
}

pub async fn create_confession(
    State(state): State<AppState>,
    Json(req): Json<CreateConfessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let confession = state.whispr.create_confession(req).await?;
    Ok((StatusCode::CREATED, Json(confession)))
}

pub async fn delete_confession(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    state.whispr.delete_confession(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Throttled and own-post toggles still answer 200 with the unchanged
/// confession and `added: false`.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .whispr
        .toggle_reaction(id, &req.user_id, &req.reaction_type)
        .await?;
    if !outcome.applied() {
        debug!("Reaction on {} not applied: {:?}", id, outcome.status);
    }
    let added = outcome.added();
    Ok(Json(ToggleReactionResponse {
        confession: outcome.confession,
        added,
    }))
}
