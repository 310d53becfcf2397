//! HTTP API layer for agora.
//!
//! - **Endpoints**: users, posts, comments, likes, health and database diagnostics
//! - **Extractors**: authentication and validated JSON, query and path input
//! - **Middleware**: token authentication, rate limiting, security headers
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;
pub mod security;

use axum::Router;

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig};
pub use security::security_headers;

/// The API router with authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
