//! HTTP handlers for companies and vessels.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

use super::models::{Company, Vessel};
use super::requests::{
    CompanyUpdate, CreateCompanyRequest, CreateVesselRequest, ListCompaniesQuery,
    ListVesselsQuery, VesselUpdate,
};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/:id",
            get(get_company)
                .patch(update_company)
                .delete(deactivate_company),
        )
        .route("/vessels", get(list_vessels).post(create_vessel))
        .route(
            "/vessels/:id",
            get(get_vessel).patch(update_vessel).delete(deactivate_vessel),
        )
}

async fn list_companies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListCompaniesQuery>,
) -> Result<Json<Vec<Company>>> {
    let companies = services::list_companies(&state.db, query.include_inactive).await?;
    Ok(Json(companies))
}

async fn get_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Company>> {
    Ok(Json(services::get_company(&state.db, id).await?))
}

async fn create_company(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>)> {
    let company = services::create_company(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

async fn update_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<CompanyUpdate>,
) -> Result<Json<Company>> {
    Ok(Json(services::update_company(&state.db, id, update).await?))
}

async fn deactivate_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode> {
    services::deactivate_company(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_vessels(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListVesselsQuery>,
) -> Result<Json<Vec<Vessel>>> {
    let vessels =
        services::list_vessels(&state.db, query.company_id, query.include_inactive).await?;
    Ok(Json(vessels))
}

async fn get_vessel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vessel>> {
    Ok(Json(services::get_vessel(&state.db, id).await?))
}

async fn create_vessel(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVesselRequest>,
) -> Result<(StatusCode, Json<Vessel>)> {
    let vessel = services::create_vessel(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(vessel)))
}

async fn update_vessel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<VesselUpdate>,
) -> Result<Json<Vessel>> {
    Ok(Json(services::update_vessel(&state.db, id, update).await?))
}

async fn deactivate_vessel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode> {
    services::deactivate_vessel(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
