use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::categories::models::Category;
use crate::features::navs::dtos::NavResponseDto;
use crate::shared::constants::HOME_PAGE_SIZE;
use crate::shared::types::Pagination;

/// Query params for the landing page payload
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HomeQuery {
    /// Nav page applied to every subcategory (clamped to >= 1)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Nav page size applied to every subcategory (clamped to 1-50)
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    HOME_PAGE_SIZE
}

/// A subcategory on the landing page: category fields plus its visible
/// navs and their pagination summary. The tree is truncated here, no
/// further children are attached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeSubcategoryDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub level: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub navs: Vec<NavResponseDto>,
    pub pagination: Pagination,
}

impl HomeSubcategoryDto {
    pub fn new(category: Category, navs: Vec<NavResponseDto>, pagination: Pagination) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            description: category.description,
            sort_order: category.sort_order,
            level: category.level,
            is_public: category.is_public,
            created_at: category.created_at,
            navs,
            pagination,
        }
    }

    /// A subcategory whose navs are withheld from the caller
    pub fn hidden(category: Category, page: i64, size: i64) -> Self {
        Self::new(category, Vec::new(), Pagination::empty(page, size))
    }
}

/// A root category on the landing page with its subcategories
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeCategoryDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub level: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub children: Vec<HomeSubcategoryDto>,
}

impl HomeCategoryDto {
    pub fn new(category: Category, children: Vec<HomeSubcategoryDto>) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            description: category.description,
            sort_order: category.sort_order,
            level: category.level,
            is_public: category.is_public,
            created_at: category.created_at,
            children,
        }
    }
}
