//! Top-level router

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{companies, pricing, visits, AppState};

/// Build the application router with every endpoint and layer attached
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(companies::router())
        .merge(pricing::router())
        .merge(visits::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": state.cache.stats(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AppCache;
    use crate::config::Config;
    use crate::pricing::models::fixtures::price_table;
    use crate::pricing::PriceTableDirectory;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    // The pool never connects; every request below must be answered
    // before any query runs.
    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/abrolhos_test".to_string()),
            _ => None,
        })
        .unwrap();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::new(db, AppCache::new(Duration::from_secs(60)), config)
    }

    async fn seed_prices(state: &AppState) {
        let directory = Arc::new(PriceTableDirectory::new(vec![price_table(2025, None)]));
        assert!(
            state
                .cache
                .store_directory(directory, state.cache.generation())
                .await
        );
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_quote_rejects_zero_permanence() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/prices/quote",
                json!({
                    "date": "2025-03-10",
                    "visitors": { "foreign": 1 },
                    "permanence": 0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error_type"], "validation");
    }

    #[tokio::test]
    async fn test_quote_from_cached_snapshot() {
        let state = test_state();
        seed_prices(&state).await;

        let response = router(state)
            .oneshot(json_request(
                "POST",
                "/prices/quote",
                json!({
                    "date": "2025-03-10",
                    "visitors": { "foreign": 2, "domestic": 1, "exempt": 3 },
                    "vessel_length_m": 12.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"]["amount"], "291.00");
        assert_eq!(body["total"]["currency"], "BRL");
        assert_eq!(body["tickets"], 3);
        assert_eq!(body["visitors"], 6);
        assert_eq!(body["priced"], true);
    }

    #[tokio::test]
    async fn test_quote_outside_any_table_is_unpriced() {
        let state = test_state();
        seed_prices(&state).await;

        let response = router(state)
            .oneshot(json_request(
                "POST",
                "/prices/quote",
                json!({ "date": "2019-12-31", "visitors": { "foreign": 4 } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"]["amount"], "0.00");
        assert_eq!(body["priced"], false);
        assert!(body["price_table_id"].is_null());
    }

    #[tokio::test]
    async fn test_create_visit_rejects_zero_permanence() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/visits",
                json!({
                    "visit_date": "2025-03-10",
                    "company_id": "5b0c4a3e-0d8f-4c1a-9e43-6a1f0f2d8c11",
                    "vessel_id": "a7e1d9b2-3c4f-4e5a-8b6c-7d8e9f0a1b2c",
                    "permanence": 0,
                    "visitors": { "domestic": 2 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_monthly_report_rejects_bad_month() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::get("/reports/monthly?year=2025&month=13")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_statement_rejects_inverted_period() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::get(
                    "/reports/statement?company_id=5b0c4a3e-0d8f-4c1a-9e43-6a1f0f2d8c11&from=2025-03-31&to=2025-03-01",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/prices/quote",
                json!({ "date": "2025-03-10", "visitors": { "foreign": -1 } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error_type"], "validation");
        assert!(body["message"].as_str().unwrap().contains("foreign"));
    }

    #[tokio::test]
    async fn test_malformed_query_gets_json_error() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::get("/visits?from=2025-13-01&to=2025-12-31")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error_type"], "validation");
    }

    #[tokio::test]
    async fn test_malformed_path_id_gets_json_error() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::delete("/vessels/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error_type"], "validation");
    }

    #[tokio::test]
    async fn test_create_company_rejects_bad_tax_id() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/companies",
                json!({ "name": "Mar Aberto", "tax_id": "11.222.333/0001-82" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("tax_id"));
    }

    #[tokio::test]
    async fn test_create_vessel_rejects_non_positive_length() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/vessels",
                json!({
                    "company_id": "5b0c4a3e-0d8f-4c1a-9e43-6a1f0f2d8c11",
                    "name": "Lancha Azul",
                    "kind": "speedboat",
                    "length_m": 0.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("length_m"));
    }

    #[tokio::test]
    async fn test_update_vessel_rejects_negative_length() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "PATCH",
                "/vessels/a7e1d9b2-3c4f-4e5a-8b6c-7d8e9f0a1b2c",
                json!({ "length_m": -2.0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
