//! Comment service.

use std::collections::{BTreeSet, HashMap};

use agora_common::{AppError, AppResult, ValidateInOrder};
use agora_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::pagination::{MAX_COMMENT_PAGE, Pagination};
use crate::services::post::CommentView;
use crate::services::user::PublicUser;

const MAX_COMMENT_CHARS: usize = 150;

/// Input for writing or editing a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CommentInput {
    /// Comment text.
    #[validate(length(
        min = 1,
        max = 150,
        message = "content must be between 1 and 150 characters"
    ))]
    pub content: String,
}

impl ValidateInOrder for CommentInput {
    const FIELDS: &'static [&'static str] = &["content"];
}

impl CommentInput {
    fn normalized(&self) -> AppResult<String> {
        self.validate_in_order()?;
        let trimmed = self.content.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::Validation(
                "content must be between 1 and 150 characters".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
        }
    }

    /// Comment on a post.
    pub async fn create(
        &self,
        post_id: i32,
        user_id: i32,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let content = input.normalized()?;
        self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            content: Set(content),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = comment.id, post_id, user_id, "Created comment");

        Ok(comment)
    }

    /// Comments on a post with their authors, oldest first.
    pub async fn list(
        &self,
        post_id: i32,
        pagination: Pagination,
    ) -> AppResult<(Vec<CommentView>, Pagination)> {
        self.post_repo.get_by_id(post_id).await?;

        let page = pagination.clamp(MAX_COMMENT_PAGE);
        let comments = self
            .comment_repo
            .find_by_post(post_id, page.limit_u64(), page.offset_u64())
            .await?;

        let user_ids: BTreeSet<i32> = comments.iter().map(|c| c.user_id).collect();
        let user_ids: Vec<i32> = user_ids.into_iter().collect();
        let users: HashMap<i32, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let views = comments
            .into_iter()
            .map(|comment| CommentView {
                author: users.get(&comment.user_id).cloned().map(PublicUser::from),
                comment,
            })
            .collect();

        Ok((views, page))
    }

    /// Edit a comment. Owner only.
    pub async fn update(
        &self,
        post_id: i32,
        comment_id: i32,
        user_id: i32,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let content = input.normalized()?;
        let comment = self.owned_comment(post_id, comment_id, user_id).await?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(chrono::Utc::now().into());

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Owner only.
    pub async fn delete(&self, post_id: i32, comment_id: i32, user_id: i32) -> AppResult<()> {
        self.owned_comment(post_id, comment_id, user_id).await?;

        if self.comment_repo.delete_owned(comment_id, user_id).await? == 0 {
            return Err(AppError::CommentNotFound);
        }

        tracing::info!(comment_id, post_id, user_id, "Deleted comment");
        Ok(())
    }

    /// Load a comment of `post_id` and check that `user_id` wrote it.
    async fn owned_comment(
        &self,
        post_id: i32,
        comment_id: i32,
        user_id: i32,
    ) -> AppResult<comment::Model> {
        self.post_repo.get_by_id(post_id).await?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.post_id != post_id {
            return Err(AppError::CommentNotFound);
        }
        if comment.user_id != user_id {
            return Err(AppError::Unauthorized);
        }

        Ok(comment)
    }
}
