//! Health check endpoint.

use agora_core::HealthReport;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::middleware::AppState;

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.system_service.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
