//! Core business logic for agora.

pub mod pagination;
pub mod seed;
pub mod services;

pub use pagination::Pagination;
pub use services::*;
