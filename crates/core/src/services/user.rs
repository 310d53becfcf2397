//! User service.

use std::collections::HashMap;

use agora_common::{AppError, AppResult, ValidateInOrder};
use agora_db::{
    entities::{like, post, user},
    repositories::{LikeRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::{MAX_POST_PAGE, Pagination};
use crate::services::auth::{TokenClaims, TokenService, hash_password, verify_password};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    like_repo: LikeRepository,
    tokens: TokenService,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterInput {
    /// Unique username.
    #[validate(length(
        min = 3,
        max = 50,
        message = "username must be between 3 and 50 characters"
    ))]
    pub username: String,

    /// Email address.
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    /// Plain-text password.
    #[validate(length(
        min = 6,
        max = 12,
        message = "password must be between 6 and 12 characters"
    ))]
    pub password: String,

    /// Age.
    #[validate(range(min = 1, max = 150, message = "age must be between 1 and 150"))]
    pub age: Option<i32>,

    /// City.
    #[validate(length(max = 100, message = "city must be at most 100 characters"))]
    pub city: Option<String>,
}

impl ValidateInOrder for RegisterInput {
    const FIELDS: &'static [&'static str] = &["username", "email", "password", "age", "city"];
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginInput {
    /// Email address.
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    /// Plain-text password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl ValidateInOrder for LoginInput {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

/// Input for updating the caller's profile. Only these fields are mutable.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileInput {
    /// Age.
    #[validate(range(min = 1, max = 150, message = "age must be between 1 and 150"))]
    pub age: Option<i32>,

    /// City.
    #[validate(length(max = 100, message = "city must be at most 100 characters"))]
    pub city: Option<String>,
}

impl ValidateInOrder for UpdateProfileInput {
    const FIELDS: &'static [&'static str] = &["age", "city"];
}

/// Public view of a user: no email, no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    /// User ID.
    pub id: i32,
    /// Username.
    pub username: String,
    /// Age, if given.
    pub age: Option<i32>,
    /// City, if given.
    pub city: Option<String>,
}

impl From<user::Model> for PublicUser {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            age: user.age,
            city: user.city,
        }
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: user::Model,
    /// Signed access token.
    pub token: String,
}

/// A like together with the post it points at.
#[derive(Debug, Clone, Serialize)]
pub struct LikedPost {
    /// The like row.
    #[serde(flatten)]
    pub like: like::Model,
    /// The liked post, `None` if it vanished in between queries.
    pub post: Option<post::Model>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        like_repo: LikeRepository,
        tokens: TokenService,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            like_repo,
            tokens,
        }
    }

    /// Register a new account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate_in_order()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Account already exists".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            age: Set(input.age),
            city: Set(input.city),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Authenticate with email and password and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResult> {
        input.validate_in_order()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;

        Ok(LoginResult { user, token })
    }

    /// Resolve an access token into its claims.
    pub fn authenticate(&self, token: &str) -> AppResult<TokenClaims> {
        self.tokens.verify(token)
    }

    /// Get the caller's own profile.
    pub async fn profile(&self, user_id: i32) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Update age and city.
    pub async fn update_profile(
        &self,
        user_id: i32,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate_in_order()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        if input.age.is_none() && input.city.is_none() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(age) = input.age {
            active.age = Set(Some(age));
        }
        if let Some(city) = input.city {
            active.city = Set(Some(city));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        self.user_repo.update(active).await
    }

    /// Look up a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Posts a user has liked, most recent like first.
    ///
    /// Returns the effective (clamped) pagination alongside the page.
    pub async fn liked_posts(
        &self,
        user_id: i32,
        pagination: Pagination,
    ) -> AppResult<(Vec<LikedPost>, Pagination)> {
        self.user_repo.get_by_id(user_id).await?;

        let page = pagination.clamp(MAX_POST_PAGE);
        let likes = self
            .like_repo
            .find_by_user(user_id, page.limit_u64(), page.offset_u64())
            .await?;

        let post_ids: Vec<i32> = likes.iter().map(|l| l.post_id).collect();
        let mut posts: HashMap<i32, post::Model> = self
            .post_repo
            .find_by_ids(&post_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let liked = likes
            .into_iter()
            .map(|like| {
                let post = posts.remove(&like.post_id);
                LikedPost { like, post }
            })
            .collect();

        Ok((liked, page))
    }
}
