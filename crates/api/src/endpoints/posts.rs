//! Posts, comments and likes endpoints.

use agora_common::{AppResult, ValidateInOrder};
use agora_core::{
    CommentInput, CommentView, CreatePostInput, Pagination, PostView, UpdatePostInput,
};
use agora_db::entities::{comment, post};
use axum::{
    Router,
    extract::State,
    routing::{get, post as post_route, put},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, ValidatedJson, ValidatedPath, ValidatedQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// `/posts/{id}` path.
#[derive(Debug, Deserialize, Validate)]
pub struct PostIdPath {
    /// Post ID.
    #[validate(range(min = 1, message = "id must be a positive integer"))]
    pub id: i32,
}

impl ValidateInOrder for PostIdPath {
    const FIELDS: &'static [&'static str] = &["id"];
}

/// `/posts/user/{user_id}` path.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthorPath {
    /// Author ID.
    #[validate(range(min = 1, message = "user_id must be a positive integer"))]
    pub user_id: i32,
}

impl ValidateInOrder for AuthorPath {
    const FIELDS: &'static [&'static str] = &["user_id"];
}

/// `/posts/{id}/comments/{comment_id}` path.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentPath {
    /// Post ID.
    #[validate(range(min = 1, message = "id must be a positive integer"))]
    pub id: i32,
    /// Comment ID.
    #[validate(range(min = 1, message = "comment_id must be a positive integer"))]
    pub comment_id: i32,
}

impl ValidateInOrder for CommentPath {
    const FIELDS: &'static [&'static str] = &["id", "comment_id"];
}

/// Like toggle response.
#[derive(Serialize)]
pub struct LikeResponse {
    /// `"liked"` or `"unliked"`.
    pub action: &'static str,
    /// State after the toggle.
    pub liked: bool,
    /// Likes on the post after the toggle.
    pub likes_count: u64,
}

async fn create(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePostInput>,
) -> AppResult<ApiResponse<post::Model>> {
    let post = state.post_service.create(claims.id, input).await?;
    Ok(ApiResponse::created("Post created successfully", post))
}

async fn list(
    State(state): State<AppState>,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let (posts, page) = state.post_service.list(pagination).await?;
    Ok(ApiResponse::ok("Posts fetched successfully", posts).with_pagination(page))
}

async fn show(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.get(path.id).await?;
    Ok(ApiResponse::ok("Post fetched successfully", post))
}

async fn update(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
    ValidatedJson(input): ValidatedJson<UpdatePostInput>,
) -> AppResult<ApiResponse<post::Model>> {
    let post = state.post_service.update(path.id, claims.id, input).await?;
    Ok(ApiResponse::ok("Post updated successfully", post))
}

async fn delete(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(path.id, claims.id).await?;
    Ok(ApiResponse::message("Post deleted successfully"))
}

async fn by_user(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<AuthorPath>,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let (posts, page) = state
        .post_service
        .list_by_user(path.user_id, pagination)
        .await?;
    Ok(ApiResponse::ok("User posts fetched successfully", posts).with_pagination(page))
}

async fn toggle_like(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let result = state.like_service.toggle(path.id, claims.id).await?;
    let message = if result.liked {
        "Post liked"
    } else {
        "Post unliked"
    };

    Ok(ApiResponse::ok(
        message,
        LikeResponse {
            action: result.action(),
            liked: result.liked,
            likes_count: result.likes_count,
        },
    ))
}

async fn create_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
    ValidatedJson(input): ValidatedJson<CommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .create(path.id, claims.id, input)
        .await?;
    Ok(ApiResponse::created("Comment created successfully", comment))
}

async fn list_comments(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<PostIdPath>,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let (comments, page) = state.comment_service.list(path.id, pagination).await?;
    Ok(ApiResponse::ok("Comments fetched successfully", comments).with_pagination(page))
}

async fn update_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<CommentPath>,
    ValidatedJson(input): ValidatedJson<CommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .update(path.id, path.comment_id, claims.id, input)
        .await?;
    Ok(ApiResponse::ok("Comment updated successfully", comment))
}

async fn delete_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<CommentPath>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(path.id, path.comment_id, claims.id)
        .await?;
    Ok(ApiResponse::message("Comment deleted successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post_route(create).get(list))
        .route("/user/{user_id}", get(by_user))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/like", post_route(toggle_like))
        .route("/{id}/comments", post_route(create_comment).get(list_comments))
        .route(
            "/{id}/comments/{comment_id}",
            put(update_comment).delete(delete_comment),
        )
}
