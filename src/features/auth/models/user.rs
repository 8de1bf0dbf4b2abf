use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a console user
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
