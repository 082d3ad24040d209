use axum::{
    routing::post,
    Router,
    extract::{State, Path},
    Json
};
use common::config::LookerConfig;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::models::{Report, ReportKind};
use crate::services::{AppError, HealthService};
use super::models::ApiResponse;

pub async fn health_check() -> Json<&'static str> {
    Json("ok")
}

pub async fn run_report(
    Path(test_id): Path<String>,
    State(service): State<Arc<HealthService>>,
    Json(config): Json<LookerConfig>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    let kind: ReportKind = test_id.parse().map_err(|_| {
        let known: Vec<&str> = ReportKind::ALL.iter().map(ReportKind::test_id).collect();
        AppError::bad_request(format!(
            "unknown report '{}', expected one of: {}",
            test_id,
            known.join(", ")
        ))
    })?;
    let report = service.run(kind, &config).await?;
    Ok(Json(ApiResponse::success(report)))
}

pub fn routes(service: Arc<HealthService>) -> Router {
    Router::new()
        .route("/", post(health_check))
        .route("/stats/{test_id}", post(run_report))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
