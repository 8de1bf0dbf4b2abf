use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::models::User;
use crate::shared::validation::USERNAME_REGEX;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Extends the token lifetime from 24 hours to 7 days
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Response DTO for a console user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Issued bearer token details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Response DTO for a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub user: UserResponseDto,
    pub token: TokenResponseDto,
}
