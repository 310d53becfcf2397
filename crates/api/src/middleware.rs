//! API middleware.

use agora_core::{CommentService, LikeService, PostService, SystemService, UserService};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and tokens.
    pub user_service: UserService,
    /// Posts.
    pub post_service: PostService,
    /// Comments.
    pub comment_service: CommentService,
    /// Likes.
    pub like_service: LikeService,
    /// Health and database diagnostics.
    pub system_service: SystemService,
}

/// Extract a bearer token from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// A valid token puts its [`agora_core::TokenClaims`] into the request
/// extensions; anything else leaves the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(ToString::to_string);

    if let Some(token) = token {
        if let Ok(claims) = state.user_service.authenticate(&token) {
            req.extensions_mut().insert(claims);
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
