use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/profile", get(handlers::profile))
        .route("/api/auth/verify", get(handlers::verify))
        .route("/api/auth/register", post(handlers::register))
        .with_state(service)
}
