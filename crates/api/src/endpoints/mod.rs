//! API endpoints.

mod database;
mod health;
mod posts;
mod users;

use agora_common::AppError;
use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/database", database::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}
