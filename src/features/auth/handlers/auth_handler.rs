use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, RegisterRequestDto, UserResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Log out, revoking the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<()>>> {
    service.logout(&user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Logged out".to_string()),
        None,
    )))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn profile(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Verify the presented token and return its user
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Invalid, expired or revoked token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn verify(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.profile(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Token is valid".to_string()),
        None,
    )))
}

/// Register a new console account (admin only)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the admin account"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn register(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.register(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(created), None, None)),
    ))
}
