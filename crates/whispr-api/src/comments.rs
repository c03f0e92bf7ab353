use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use whispr_store::content::CommentParent;
use whispr_types::api::{CreateCommentRequest, DeleteCommentRequest, LimitQuery};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_confession_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    Json(state.whispr.list_comments(CommentParent::Confession(id), query.limit).await)
}

pub async fn list_market_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    Json(state.whispr.list_comments(CommentParent::Market(id), query.limit).await)
}

// The route decides the parent; ids in the body are overwritten.

pub async fn create_confession_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = CreateCommentRequest {
        confession_id: Some(id),
        market_item_id: None,
        ..req
    };
    let comment = state.whispr.create_comment(req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn create_market_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = CreateCommentRequest {
        confession_id: None,
        market_item_id: Some(id),
        ..req
    };
    let comment = state.whispr.create_comment(req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeleteCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.whispr.delete_comment(id, &req.author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
