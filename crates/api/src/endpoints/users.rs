//! Users endpoints.

use agora_common::{AppResult, ValidateInOrder};
use agora_core::{
    LikedPost, LoginInput, Pagination, PublicUser, RegisterInput, TokenClaims,
    UpdateProfileInput,
};
use agora_db::entities::user;
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, ValidatedJson, ValidatedPath, ValidatedQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// `/users/{user_id}/...` path.
#[derive(Debug, Deserialize, Validate)]
pub struct UserIdPath {
    /// Target user.
    #[validate(range(min = 1, message = "user_id must be a positive integer"))]
    pub user_id: i32,
}

impl ValidateInOrder for UserIdPath {
    const FIELDS: &'static [&'static str] = &["user_id"];
}

/// `/users/username/{username}` path.
#[derive(Debug, Deserialize, Validate)]
pub struct UsernamePath {
    /// Exact username.
    #[validate(length(min = 1, max = 50, message = "username must be between 1 and 50 characters"))]
    pub username: String,
}

impl ValidateInOrder for UsernamePath {
    const FIELDS: &'static [&'static str] = &["username"];
}

/// Login response.
#[derive(Serialize)]
pub struct LoginResponse {
    /// The authenticated user.
    pub user: user::Model,
    /// Bearer token for subsequent requests.
    pub token: String,
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.register(input).await?;
    Ok(ApiResponse::created("Registration successful", user))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let result = state.user_service.login(input).await?;
    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            user: result.user,
            token: result.token,
        },
    ))
}

async fn profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.profile(claims.id).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", user))
}

async fn update_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.update_profile(claims.id, input).await?;
    Ok(ApiResponse::ok("Profile updated successfully", user))
}

async fn liked_posts(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<UserIdPath>,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> AppResult<ApiResponse<Vec<LikedPost>>> {
    let (likes, page) = state
        .user_service
        .liked_posts(path.user_id, pagination)
        .await?;
    Ok(ApiResponse::ok("Liked posts fetched successfully", likes).with_pagination(page))
}

async fn by_username(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<UsernamePath>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = state.user_service.get_by_username(&path.username).await?;
    Ok(ApiResponse::ok("User fetched successfully", user.into()))
}

async fn verify(AuthUser(claims): AuthUser) -> ApiResponse<TokenClaims> {
    ApiResponse::ok("Token is valid", claims)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile).put(update_profile))
        .route("/verify", get(verify))
        .route("/username/{username}", get(by_username))
        .route("/{user_id}/liked-posts", get(liked_posts))
}
