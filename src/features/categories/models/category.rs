use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a navigation category.
/// `level` is a cached depth (1 for roots), recomputed when a category is
/// moved to a new parent.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub level: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}
