//! Demo data for local development.

use agora_common::{AppError, AppResult};

use crate::services::{
    CommentInput, CommentService, CreatePostInput, LikeService, PostService, RegisterInput,
    UserService,
};

/// Username of the first demo account; its presence marks the data as seeded.
pub const DEMO_USERNAME: &str = "testuser";

/// Insert demo users, posts, a comment and a like.
///
/// Returns `false` without touching anything when the demo user already exists.
pub async fn seed_test_data(
    users: &UserService,
    posts: &PostService,
    comments: &CommentService,
    likes: &LikeService,
) -> AppResult<bool> {
    match users.get_by_username(DEMO_USERNAME).await {
        Ok(_) => {
            tracing::info!("Demo data already present, skipping seed");
            return Ok(false);
        }
        Err(AppError::UserNotFound) => {}
        Err(e) => return Err(e),
    }

    let alice = users
        .register(RegisterInput {
            username: DEMO_USERNAME.to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            age: Some(25),
            city: Some("Taipei".to_string()),
        })
        .await?;
    let bob = users
        .register(RegisterInput {
            username: "demouser".to_string(),
            email: "demo@example.com".to_string(),
            password: "password123".to_string(),
            age: Some(31),
            city: Some("Tainan".to_string()),
        })
        .await?;

    let first = posts
        .create(
            alice.id,
            CreatePostInput {
                content: "Hello from the demo account!".to_string(),
            },
        )
        .await?;
    posts
        .create(
            bob.id,
            CreatePostInput {
                content: "Second demo post, nothing to see here.".to_string(),
            },
        )
        .await?;

    comments
        .create(
            first.id,
            bob.id,
            CommentInput {
                content: "Welcome aboard!".to_string(),
            },
        )
        .await?;
    likes.toggle(first.id, bob.id).await?;

    tracing::info!(users = 2, posts = 2, "Seeded demo data");
    Ok(true)
}
