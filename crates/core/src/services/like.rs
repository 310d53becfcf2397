//! Like service.

use agora_common::AppResult;
use agora_db::{
    entities::like,
    repositories::{LikeRepository, PostRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Outcome of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleLikeResult {
    /// Whether the caller likes the post afterwards.
    pub liked: bool,
    /// Likes on the post afterwards.
    pub likes_count: u64,
}

impl ToggleLikeResult {
    /// `"liked"` or `"unliked"`.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        if self.liked { "liked" } else { "unliked" }
    }
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
        }
    }

    /// Like the post if the user has not yet, otherwise take the like back.
    pub async fn toggle(&self, post_id: i32, user_id: i32) -> AppResult<ToggleLikeResult> {
        self.post_repo.get_by_id(post_id).await?;

        let liked = match self.like_repo.find_by_post_and_user(post_id, user_id).await? {
            Some(existing) => {
                self.like_repo.delete(existing).await?;
                false
            }
            None => {
                let model = like::ActiveModel {
                    post_id: Set(post_id),
                    user_id: Set(user_id),
                    ..Default::default()
                };
                // A concurrent toggle may have inserted first; the pair is liked either way.
                if !self.like_repo.create(model).await? {
                    tracing::debug!(post_id, user_id, "Like already present");
                }
                true
            }
        };

        let likes_count = self.like_repo.count_by_post(post_id).await?;
        tracing::debug!(post_id, user_id, liked, likes_count, "Toggled like");

        Ok(ToggleLikeResult { liked, likes_count })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use agora_common::AppError;
    use agora_db::entities::post;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_post(id: i32) -> post::Model {
        post::Model {
            id,
            user_id: 1,
            content: "post".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_like(id: i32, post_id: i32, user_id: i32) -> like::Model {
        like::Model {
            id,
            post_id,
            user_id,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn post_db() -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(1)]])
                .into_connection(),
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_toggle_adds_like() {
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );

        let service = LikeService::new(LikeRepository::new(like_db), PostRepository::new(post_db()));
        let result = service.toggle(1, 2).await.unwrap();

        assert!(result.liked);
        assert_eq!(result.likes_count, 1);
        assert_eq!(result.action(), "liked");
    }

    #[tokio::test]
    async fn test_toggle_counts_concurrent_insert_as_liked() {
        // The lookup saw no like, but another request inserted it first.
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );

        let service = LikeService::new(LikeRepository::new(like_db), PostRepository::new(post_db()));
        let result = service.toggle(1, 2).await.unwrap();

        assert!(result.liked);
        assert_eq!(result.likes_count, 1);
        assert_eq!(result.action(), "liked");
    }

    #[tokio::test]
    async fn test_toggle_removes_like() {
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like(1, 1, 2)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );

        let service = LikeService::new(LikeRepository::new(like_db), PostRepository::new(post_db()));
        let result = service.toggle(1, 2).await.unwrap();

        assert!(!result.liked);
        assert_eq!(result.likes_count, 0);
        assert_eq!(result.action(), "unliked");
    }

    #[tokio::test]
    async fn test_toggle_on_missing_post() {
        let missing = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let like_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = LikeService::new(LikeRepository::new(like_db), PostRepository::new(missing));
        assert!(matches!(
            service.toggle(1, 2).await,
            Err(AppError::PostNotFound)
        ));
    }
}
