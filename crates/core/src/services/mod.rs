//! Business logic services.

pub mod auth;
pub mod comment;
pub mod like;
pub mod post;
pub mod system;
pub mod user;

pub use auth::{TokenClaims, TokenService, hash_password, verify_password};
pub use comment::{CommentInput, CommentService};
pub use like::{LikeService, ToggleLikeResult};
pub use post::{CommentView, CreatePostInput, PostService, PostView, UpdatePostInput};
pub use system::{ConnectionTest, DatabaseStatus, HealthReport, SystemService};
pub use user::{
    LikedPost, LoginInput, LoginResult, PublicUser, RegisterInput, UpdateProfileInput,
    UserService,
};
