//! HTTP handlers for visits and reports.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

use super::requests::{
    CreateVisitRequest, ListVisitsQuery, MonthlyQuery, StatementQuery, VisitUpdate,
};
use super::responses::{CompanyStatement, MonthlySummary, VisitResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/visits", post(create).get(list))
        .route("/visits/:id", patch(update).delete(delete))
        .route("/reports/monthly", get(monthly))
        .route("/reports/statement", get(statement))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVisitRequest>,
) -> Result<(StatusCode, Json<VisitResponse>)> {
    let record = services::create_visit(
        &state.db,
        &state.cache,
        state.config.unpriced_visits,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record.try_into()?)))
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListVisitsQuery>,
) -> Result<Json<Vec<VisitResponse>>> {
    query.validate()?;
    let records = services::list_visits(&state.db, query.from, query.to, query.company_id).await?;
    let visits = records
        .into_iter()
        .map(VisitResponse::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(visits))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<VisitUpdate>,
) -> Result<Json<VisitResponse>> {
    let record = services::update_visit(
        &state.db,
        &state.cache,
        state.config.unpriced_visits,
        id,
        update,
    )
    .await?;
    Ok(Json(record.try_into()?))
}

async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode> {
    services::delete_visit(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn monthly(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MonthlyQuery>,
) -> Result<Json<MonthlySummary>> {
    let summary = services::monthly_summary(&state.db, &query).await?;
    Ok(Json(summary))
}

async fn statement(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatementQuery>,
) -> Result<Json<CompanyStatement>> {
    query.validate()?;
    let statement =
        services::company_statement(&state.db, query.company_id, query.from, query.to).await?;
    Ok(Json(statement))
}
