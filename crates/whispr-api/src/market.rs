use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use whispr_store::content::MarketQuery;
use whispr_types::api::{CreateMarketItemRequest, ListMarketQuery, ToggleSoldRequest};

use crate::caller::CallerId;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_market_items(
    State(state): State<AppState>,
    Query(query): Query<ListMarketQuery>,
) -> impl IntoResponse {
    Json(state.whispr.list_market_items(MarketQuery::from(query)).await)
}

pub async fn create_market_item(
    State(state): State<AppState>,
    Json(req): Json<CreateMarketItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.whispr.create_market_item(req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn toggle_sold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleSoldRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.whispr.toggle_sold(id, &req.seller_id).await?;
    Ok(Json(item))
}

pub async fn delete_market_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    state.whispr.delete_market_item(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
