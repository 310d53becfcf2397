//! Like repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Like, like};
use agora_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TryInsertResult,
    sea_query::{Expr, OnConflict},
};

#[derive(Debug, FromQueryResult)]
struct PostLikeCount {
    post_id: i32,
    count: i64,
}

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the like a user left on a post, if any.
    pub async fn find_by_post_and_user(
        &self,
        post_id: i32,
        user_id: i32,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like unless the (post, user) pair already exists.
    ///
    /// Returns `false` when nothing was inserted, which happens when two
    /// toggles race each other.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<bool> {
        let result = Like::insert(model)
            .on_conflict(
                OnConflict::columns([like::Column::PostId, like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches!(result, TryInsertResult::Inserted(rows) if rows > 0))
    }

    /// Delete a like.
    pub async fn delete(&self, like: like::Model) -> AppResult<()> {
        like.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Likes left by a user, newest first (paginated).
    pub async fn find_by_user(
        &self,
        user_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .order_by_desc(like::Column::CreatedAt)
            .order_by_desc(like::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: i32) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes for several posts in one query.
    ///
    /// Posts without likes are absent from the returned map.
    pub async fn count_by_posts(&self, post_ids: &[i32]) -> AppResult<HashMap<i32, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Like::find()
            .select_only()
            .column(like::Column::PostId)
            .column_as(Expr::col(like::Column::Id).count(), "count")
            .filter(like::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(like::Column::PostId)
            .into_model::<PostLikeCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.count.max(0) as u64))
            .collect())
    }
}
