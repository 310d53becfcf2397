//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p agora-db --test db_integration -- --ignored --test-threads=1`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `agora_test`)
//!   `TEST_DB_PASSWORD` (default: `agora_test`)
//!   `TEST_DB_NAME` (default: `agora_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use agora_db::entities::{comment, like, post, user};
use agora_db::repositories::{CommentRepository, LikeRepository, PostRepository, UserRepository};
use agora_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{DatabaseConnection, Set};

async fn fresh_db() -> Arc<DatabaseConnection> {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Cleanup failed");
    Arc::new(db.conn)
}

async fn insert_user(repo: &UserRepository, username: &str) -> user::Model {
    repo.create(user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        ..Default::default()
    })
    .await
    .unwrap()
}

async fn insert_post(repo: &PostRepository, user_id: i32, content: &str) -> post::Model {
    repo.create(post::ActiveModel {
        user_id: Set(user_id),
        content: Set(content.to_string()),
        ..Default::default()
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::with_config(TestDbConfig::default()).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_ping() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    assert!(agora_db::ping(db.connection()).await.is_ok());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_user_lookup_by_email_and_username() {
    let db = fresh_db().await;
    let users = UserRepository::new(db);

    let alice = insert_user(&users, "alice").await;

    let by_email = users.find_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(alice.id));

    let by_name = users.find_by_username("alice").await.unwrap();
    assert_eq!(by_name.map(|u| u.id), Some(alice.id));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_username_rejected() {
    let db = fresh_db().await;
    let users = UserRepository::new(db);

    insert_user(&users, "alice").await;
    let result = users
        .create(user::ActiveModel {
            username: Set("alice".to_string()),
            email: Set("other@example.com".to_string()),
            password_hash: Set("x".to_string()),
            ..Default::default()
        })
        .await;

    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_like_is_unique_per_user() {
    let db = fresh_db().await;
    let users = UserRepository::new(Arc::clone(&db));
    let posts = PostRepository::new(Arc::clone(&db));
    let likes = LikeRepository::new(Arc::clone(&db));

    let alice = insert_user(&users, "alice").await;
    let post = insert_post(&posts, alice.id, "hello").await;

    let new_like = || like::ActiveModel {
        post_id: Set(post.id),
        user_id: Set(alice.id),
        ..Default::default()
    };

    assert!(likes.create(new_like()).await.unwrap());
    assert!(!likes.create(new_like()).await.unwrap());
    assert_eq!(likes.count_by_post(post.id).await.unwrap(), 1);

    let counts = likes.count_by_posts(&[post.id]).await.unwrap();
    assert_eq!(counts.get(&post.id), Some(&1));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_post_cascades() {
    let db = fresh_db().await;
    let users = UserRepository::new(Arc::clone(&db));
    let posts = PostRepository::new(Arc::clone(&db));
    let comments = CommentRepository::new(Arc::clone(&db));
    let likes = LikeRepository::new(Arc::clone(&db));

    let alice = insert_user(&users, "alice").await;
    let bob = insert_user(&users, "bob").await;
    let post = insert_post(&posts, alice.id, "hello").await;

    comments
        .create(comment::ActiveModel {
            post_id: Set(post.id),
            user_id: Set(bob.id),
            content: Set("hi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    likes
        .create(like::ActiveModel {
            post_id: Set(post.id),
            user_id: Set(bob.id),
            ..Default::default()
        })
        .await
        .unwrap();

    // Only the owner can delete.
    assert_eq!(posts.delete_owned(post.id, bob.id).await.unwrap(), 0);
    assert_eq!(posts.delete_owned(post.id, alice.id).await.unwrap(), 1);

    assert!(comments.find_by_posts(&[post.id]).await.unwrap().is_empty());
    assert_eq!(likes.count_by_post(post.id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_recent_posts_newest_first() {
    let db = fresh_db().await;
    let users = UserRepository::new(Arc::clone(&db));
    let posts = PostRepository::new(Arc::clone(&db));

    let alice = insert_user(&users, "alice").await;
    let first = insert_post(&posts, alice.id, "first").await;
    let second = insert_post(&posts, alice.id, "second").await;

    let recent = posts.find_recent(10, 0).await.unwrap();
    assert_eq!(
        recent.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let paged = posts.find_by_user(alice.id, 1, 1).await.unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, first.id);
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
