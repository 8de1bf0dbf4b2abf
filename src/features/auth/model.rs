use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request-scoped identity attached by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    /// JWT ID of the presenting token, used for revocation on logout
    pub jti: String,
    /// Expiry of the presenting token (unix seconds)
    pub exp: i64,
}

impl AuthenticatedUser {
    /// The original system has a single privileged account named "admin"
    pub fn is_admin(&self) -> bool {
        self.username == "admin"
    }
}

/// Claims carried by access tokens issued by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}
