//! HTTP handlers for price tables and quotes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

use super::requests::{CreatePriceTableRequest, PriceTableUpdate, QuoteRequest};
use super::responses::{PriceTableResponse, QuoteResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prices", get(list).post(create))
        .route("/prices/active", get(active))
        .route("/prices/quote", post(quote))
        .route("/prices/:id", patch(update).delete(deactivate))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<PriceTableResponse>>> {
    let tables = services::list_active(&state.db, &state.cache).await?;
    Ok(Json(tables.into_iter().map(PriceTableResponse::from).collect()))
}

async fn active(State(state): State<AppState>) -> Result<Json<PriceTableResponse>> {
    let table = services::active_price_table(&state.db, &state.cache).await?;
    Ok(Json(table.into()))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePriceTableRequest>,
) -> Result<(StatusCode, Json<PriceTableResponse>)> {
    let table = services::create_price_table(&state.db, &state.cache, request).await?;
    Ok((StatusCode::CREATED, Json(table.into())))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<PriceTableUpdate>,
) -> Result<Json<PriceTableResponse>> {
    let table = services::update_price_table(&state.db, &state.cache, id, update).await?;
    Ok(Json(table.into()))
}

async fn deactivate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode> {
    services::deactivate_price_table(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn quote(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let quote = services::quote(&state.db, &state.cache, request).await?;
    Ok(Json(quote.into()))
}
