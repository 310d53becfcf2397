//! Database diagnostics endpoints.

use agora_common::AppResult;
use agora_core::ConnectionTest;
use agora_db::ConnectionInfo;
use axum::{Router, extract::State, routing::get};

use crate::{middleware::AppState, response::ApiResponse};

async fn test_connection(State(state): State<AppState>) -> AppResult<ApiResponse<ConnectionTest>> {
    let result = state.system_service.test_connection().await?;
    Ok(ApiResponse::ok("Database connection successful", result))
}

async fn info(State(state): State<AppState>) -> AppResult<ApiResponse<ConnectionInfo>> {
    let info = state.system_service.connection_info()?;
    Ok(ApiResponse::ok("Database connection info", info))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test", get(test_connection))
        .route("/info", get(info))
}
