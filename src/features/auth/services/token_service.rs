use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Claims;

/// An access token as handed to the client
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 access tokens and tracks revoked token ids
/// until their natural expiry.
pub struct TokenService {
    config: AuthConfig,
    /// jti -> expiry (unix seconds) of tokens invalidated by logout
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, user_id: i64, remember_me: bool) -> Result<IssuedToken> {
        let ttl = if remember_me {
            self.config.remember_token_ttl
        } else {
            self.config.token_ttl
        };

        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(ttl)
                .map_err(|e| AppError::Internal(format!("Invalid token ttl: {}", e)))?;

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::now_v7().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: ttl.as_secs() as i64,
            expires_at,
        })
    }

    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.jwt_leeway.as_secs();

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid or expired token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Invalidate a token until its expiry; sweeps entries whose tokens
    /// have expired on their own.
    pub async fn revoke(&self, jti: &str, exp: i64) {
        let mut revoked = self.revoked.write().await;
        let now = Utc::now().timestamp();
        revoked.retain(|_, entry_exp| *entry_exp > now);
        revoked.insert(jti.to_string(), exp);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().await.contains_key(jti)
    }
}
