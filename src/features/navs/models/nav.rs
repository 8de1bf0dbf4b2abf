use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a navigation link
#[derive(Debug, Clone, FromRow)]
pub struct Nav {
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
