//! Post service.

use std::collections::{BTreeSet, HashMap};

use agora_common::{AppError, AppResult, ValidateInOrder};
use agora_db::{
    entities::{comment, post, user},
    repositories::{CommentRepository, LikeRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::{MAX_POST_PAGE, Pagination};
use crate::services::user::PublicUser;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePostInput {
    /// Post text.
    #[validate(length(
        min = 1,
        max = 300,
        message = "content must be between 1 and 300 characters"
    ))]
    pub content: String,
}

impl ValidateInOrder for CreatePostInput {
    const FIELDS: &'static [&'static str] = &["content"];
}

/// Input for updating a post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostInput {
    /// New post text.
    #[validate(length(
        min = 1,
        max = 300,
        message = "content must be between 1 and 300 characters"
    ))]
    pub content: Option<String>,
}

impl ValidateInOrder for UpdatePostInput {
    const FIELDS: &'static [&'static str] = &["content"];
}

/// A comment with its author.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    /// The comment row.
    #[serde(flatten)]
    pub comment: comment::Model,
    /// Comment author, `None` if the account is gone.
    pub author: Option<PublicUser>,
}

/// A post with its author, comments and like count.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    /// The post row.
    #[serde(flatten)]
    pub post: post::Model,
    /// Post author.
    pub author: Option<PublicUser>,
    /// Comments, oldest first.
    pub comments: Vec<CommentView>,
    /// Number of likes.
    pub likes_count: u64,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    like_repo: LikeRepository,
}

/// Trim post content, rejecting whitespace-only text.
fn normalize_content(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        like_repo: LikeRepository,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            comment_repo,
            like_repo,
        }
    }

    /// Create a post authored by `user_id`.
    pub async fn create(&self, user_id: i32, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate_in_order()?;
        let content = normalize_content(&input.content)?;

        // The token may outlive the account.
        self.user_repo.get_by_id(user_id).await?;

        let model = post::ActiveModel {
            user_id: Set(user_id),
            content: Set(content),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = post.id, user_id, "Created post");

        Ok(post)
    }

    /// Newest posts across all users.
    pub async fn list(&self, pagination: Pagination) -> AppResult<(Vec<PostView>, Pagination)> {
        let page = pagination.clamp(MAX_POST_PAGE);
        let posts = self
            .post_repo
            .find_recent(page.limit_u64(), page.offset_u64())
            .await?;

        Ok((self.hydrate(posts).await?, page))
    }

    /// A single post.
    pub async fn get(&self, id: i32) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(id).await?;
        let mut views = self.hydrate(vec![post]).await?;
        views.pop().ok_or(AppError::PostNotFound)
    }

    /// Newest posts of one user.
    pub async fn list_by_user(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> AppResult<(Vec<PostView>, Pagination)> {
        self.user_repo.get_by_id(user_id).await?;

        let page = pagination.clamp(MAX_POST_PAGE);
        let posts = self
            .post_repo
            .find_by_user(user_id, page.limit_u64(), page.offset_u64())
            .await?;

        Ok((self.hydrate(posts).await?, page))
    }

    /// Update a post's content. Owner only.
    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate_in_order()?;

        let post = self.post_repo.get_by_id(id).await?;
        if post.user_id != user_id {
            return Err(AppError::Unauthorized);
        }

        let Some(content) = input.content else {
            return Ok(post);
        };
        let content = normalize_content(&content)?;

        let mut active: post::ActiveModel = post.into();
        active.content = Set(content);
        active.updated_at = Set(chrono::Utc::now().into());

        self.post_repo.update(active).await
    }

    /// Delete a post. Owner only.
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        if post.user_id != user_id {
            return Err(AppError::Unauthorized);
        }

        if self.post_repo.delete_owned(id, user_id).await? == 0 {
            return Err(AppError::PostNotFound);
        }

        tracing::info!(post_id = id, user_id, "Deleted post");
        Ok(())
    }

    /// Attach authors, comments and like counts in a fixed number of queries.
    async fn hydrate(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let comments = self.comment_repo.find_by_posts(&post_ids).await?;

        let user_ids: BTreeSet<i32> = posts
            .iter()
            .map(|p| p.user_id)
            .chain(comments.iter().map(|c| c.user_id))
            .collect();
        let user_ids: Vec<i32> = user_ids.into_iter().collect();
        let users: HashMap<i32, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let likes = self.like_repo.count_by_posts(&post_ids).await?;

        let author = |id: i32| users.get(&id).cloned().map(PublicUser::from);

        let mut comments_by_post: HashMap<i32, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            comments_by_post
                .entry(comment.post_id)
                .or_default()
                .push(CommentView {
                    author: author(comment.user_id),
                    comment,
                });
        }

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author: author(post.user_id),
                comments: comments_by_post.remove(&post.id).unwrap_or_default(),
                likes_count: likes.get(&post.id).copied().unwrap_or(0),
                post,
            })
            .collect())
    }
}
