use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
/// This is a shared struct that can be embedded or used directly in handlers.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[allow(dead_code)]
impl PaginationQuery {
    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Get clamped page size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Sort order understood by the category and nav stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// `sort_order ASC, created_at ASC`
    #[default]
    SortOrder,
    /// `created_at DESC`
    CreatedAt,
}

/// Pagination summary attached to paginated list payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Build a summary for a page of a `total`-row result set
    pub fn new(page: i64, size: i64, total: i64) -> Self {
        let pages = if total > 0 && size > 0 {
            (total + size - 1) / size
        } else {
            0
        };
        Self {
            page,
            size,
            total,
            pages,
        }
    }

    /// Summary for an intentionally empty result (hidden content)
    pub fn empty(page: i64, size: i64) -> Self {
        Self::new(page, size, 0)
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(1, 9, 19);
        assert_eq!(p.pages, 3);
    }

    #[test]
    fn pagination_zero_total_has_zero_pages() {
        let p = Pagination::new(3, 10, 0);
        assert_eq!(p.pages, 0);
        assert_eq!(p.total, 0);
    }

    #[test]
    fn pagination_exact_multiple() {
        let p = Pagination::new(1, 10, 30);
        assert_eq!(p.pages, 3);
    }
}
