//! Limit/offset pagination.

use agora_common::ValidateInOrder;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest page the post and like listings hand out.
pub const MAX_POST_PAGE: i64 = 50;

/// Largest page the comment listing hands out.
pub const MAX_COMMENT_PAGE: i64 = 100;

/// Pagination parameters as accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Pagination {
    /// Page size.
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
    /// Rows to skip.
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be greater than or equal to 0"))]
    pub offset: i64,
}

impl ValidateInOrder for Pagination {
    const FIELDS: &'static [&'static str] = &["limit", "offset"];
}

const fn default_limit() -> i64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    /// Create pagination parameters.
    #[must_use]
    pub const fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Clamp into `1..=max_limit` and a non-negative offset.
    #[must_use]
    pub fn clamp(self, max_limit: i64) -> Self {
        Self {
            limit: self.limit.clamp(1, max_limit),
            offset: self.offset.max(0),
        }
    }

    /// Limit as a query bound. Call after [`Pagination::clamp`].
    #[must_use]
    pub const fn limit_u64(&self) -> u64 {
        self.limit as u64
    }

    /// Offset as a query bound. Call after [`Pagination::clamp`].
    #[must_use]
    pub const fn offset_u64(&self) -> u64 {
        self.offset as u64
    }
}
