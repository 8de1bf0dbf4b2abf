use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::User;

/// Persistence-facing store for console users
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(user)
    }

    pub async fn insert(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert user: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }
}
