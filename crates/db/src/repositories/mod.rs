//! Repositories wrapping entity queries.

mod comment;
mod like;
mod post;
mod user;

pub use comment::CommentRepository;
pub use like::LikeRepository;
pub use post::PostRepository;
pub use user::UserRepository;
