use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::navs::models::Nav;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::{Pagination, SortKey};

/// Request DTO for creating a nav
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNavDto {
    pub category_id: i64,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "Sort order must be a non-negative integer"))]
    #[serde(default)]
    pub sort_order: i64,

    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

/// Request DTO for updating a nav. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateNavDto {
    #[serde(default)]
    pub category_id: Option<i64>,

    #[validate(length(min = 1, message = "Title is required"))]
    #[serde(default)]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "URL is required"))]
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "Sort order must be a non-negative integer"))]
    #[serde(default)]
    pub sort_order: Option<i64>,

    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Query params for the paginated nav search
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NavSearchQuery {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_size")]
    pub size: i64,

    /// Visibility filter
    #[serde(default)]
    pub is_public: Option<bool>,

    /// Substring match against title or description
    #[serde(default)]
    pub keyword: Option<String>,

    /// Restrict to one category
    #[serde(default)]
    pub category_id: Option<i64>,

    #[serde(default)]
    pub sort: SortKey,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Response DTO for a nav
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavResponseDto {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Nav> for NavResponseDto {
    fn from(n: Nav) -> Self {
        Self {
            id: n.id,
            category_id: n.category_id,
            title: n.title,
            url: n.url,
            description: n.description,
            icon: n.icon,
            sort_order: n.sort_order,
            is_public: n.is_public,
            created_at: n.created_at,
        }
    }
}

/// Response DTO for a nav with its category's name attached
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavWithCategoryDto {
    #[serde(flatten)]
    pub nav: NavResponseDto,
    pub category_name: Option<String>,
}

/// Response DTO for the paginated nav search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavListResponseDto {
    pub list: Vec<NavWithCategoryDto>,
    pub pagination: Pagination,
}
