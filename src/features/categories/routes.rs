use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Admin category routes (require auth middleware to be applied by caller)
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/admin/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/admin/categories/roots",
            get(handlers::list_root_categories),
        )
        .route(
            "/admin/categories/children",
            get(handlers::list_subcategories),
        )
        .route(
            "/admin/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/admin/categories/{id}/children",
            get(handlers::get_category_children),
        )
        .with_state(service)
}

/// Public category routes
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories/public",
            get(handlers::list_public_categories),
        )
        .with_state(service)
}
