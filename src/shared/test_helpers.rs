#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
#[allow(dead_code)]
pub async fn test_pool() -> sqlx::SqlitePool {
    // A single connection keeps every test statement on the same in-memory
    // database (each pooled sqlite::memory: connection is its own database).
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    pool
}

#[cfg(test)]
#[allow(dead_code)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: 1,
        username: "admin".to_string(),
        jti: "test-jti".to_string(),
        exp: i64::MAX,
    }
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
#[allow(dead_code)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}
