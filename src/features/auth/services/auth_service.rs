use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, RegisterRequestDto, TokenResponseDto, UserResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::{TokenService, UserService};

/// Login, logout and account management on top of the user store and
/// token service.
pub struct AuthService {
    users: Arc<UserService>,
    tokens: Arc<TokenService>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, tokens: Arc<TokenService>, config: AuthConfig) -> Self {
        Self {
            users,
            tokens,
            config,
        }
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let user = self
            .users
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let issued = self.tokens.issue(user.id, dto.remember_me)?;
        tracing::info!("User logged in: id={}, username={}", user.id, user.username);

        Ok(LoginResponseDto {
            user: user.into(),
            token: TokenResponseDto {
                access_token: issued.access_token,
                token_type: "Bearer".to_string(),
                expires_in: issued.expires_in,
                expires_at: issued.expires_at,
            },
        })
    }

    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        self.tokens.revoke(&user.jti, user.exp).await;
        tracing::info!("User logged out: id={}", user.user_id);
        Ok(())
    }

    /// Resolve a bearer token to its user. Rejects revoked tokens and
    /// tokens whose user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.decode(token)?;

        if self.tokens.is_revoked(&claims.jti).await {
            return Err(AppError::Unauthorized(
                "Token has been revoked, please log in again".to_string(),
            ));
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Malformed token subject".to_string()))?;

        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            jti: claims.jti,
            exp: claims.exp,
        })
    }

    pub async fn profile(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        let record = self
            .users
            .get(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(record.into())
    }

    /// Register a new console account. Restricted to the admin account.
    pub async fn register(
        &self,
        current: &AuthenticatedUser,
        dto: RegisterRequestDto,
    ) -> Result<UserResponseDto> {
        if !current.is_admin() {
            return Err(AppError::Forbidden(
                "Only the admin account can register new users".to_string(),
            ));
        }

        if self.users.find_by_username(&dto.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;
        let user = self
            .users
            .insert(&dto.username, dto.email.as_deref(), &password_hash)
            .await?;

        tracing::info!("User registered: id={}, username={}", user.id, user.username);
        Ok(user.into())
    }

    /// Create the default admin account on first run
    pub async fn bootstrap_admin(&self) -> Result<()> {
        if self.users.find_by_username("admin").await?.is_some() {
            return Ok(());
        }

        let password_hash = hash_password(&self.config.admin_initial_password)?;
        self.users.insert("admin", None, &password_hash).await?;
        tracing::warn!("Created default admin account, change its password immediately");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_pool;
    use std::time::Duration;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
            remember_token_ttl: Duration::from_secs(7200),
            jwt_leeway: Duration::from_secs(0),
            admin_initial_password: "bootstrap-pass".to_string(),
        }
    }

    async fn test_service() -> AuthService {
        let pool = test_pool().await;
        let config = test_config();
        AuthService::new(
            Arc::new(UserService::new(pool)),
            Arc::new(TokenService::new(config.clone())),
            config,
        )
    }

    #[tokio::test]
    async fn bootstrap_creates_admin_once() {
        let service = test_service().await;

        service.bootstrap_admin().await.unwrap();
        service.bootstrap_admin().await.unwrap();

        let admin = service.users.find_by_username("admin").await.unwrap();
        assert!(admin.is_some());
    }

    #[tokio::test]
    async fn login_roundtrip_and_logout_revocation() {
        let service = test_service().await;
        service.bootstrap_admin().await.unwrap();

        let response = service
            .login(LoginRequestDto {
                username: "admin".to_string(),
                password: "bootstrap-pass".to_string(),
                remember_me: false,
            })
            .await
            .unwrap();

        let user = service
            .authenticate(&response.token.access_token)
            .await
            .unwrap();
        assert_eq!(user.username, "admin");

        service.logout(&user).await.unwrap();
        let err = service
            .authenticate(&response.token.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let service = test_service().await;
        service.bootstrap_admin().await.unwrap();

        let err = service
            .login(LoginRequestDto {
                username: "admin".to_string(),
                password: "wrong".to_string(),
                remember_me: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn register_requires_admin_and_unique_username() {
        let service = test_service().await;
        service.bootstrap_admin().await.unwrap();

        let admin = AuthenticatedUser {
            user_id: 1,
            username: "admin".to_string(),
            jti: "jti".to_string(),
            exp: i64::MAX,
        };

        let created = service
            .register(
                &admin,
                RegisterRequestDto {
                    username: "editor".to_string(),
                    password: "secret-pass".to_string(),
                    email: Some("editor@example.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.username, "editor");

        let duplicate = service
            .register(
                &admin,
                RegisterRequestDto {
                    username: "editor".to_string(),
                    password: "secret-pass".to_string(),
                    email: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AppError::Conflict(_)));

        let non_admin = AuthenticatedUser {
            user_id: 2,
            username: "editor".to_string(),
            jti: "jti2".to_string(),
            exp: i64::MAX,
        };
        let forbidden = service
            .register(
                &non_admin,
                RegisterRequestDto {
                    username: "other".to_string(),
                    password: "secret-pass".to_string(),
                    email: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(forbidden, AppError::Forbidden(_)));
    }
}
