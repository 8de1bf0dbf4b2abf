use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::categories::services::CategoryService;
use crate::features::navs::handlers::{self, NavState};
use crate::features::navs::services::NavService;

/// Admin nav routes (require auth middleware to be applied by caller)
pub fn protected_routes(
    nav_service: Arc<NavService>,
    category_service: Arc<CategoryService>,
) -> Router {
    let state = NavState {
        nav_service,
        category_service,
    };

    Router::new()
        .route("/admin/navs/search", get(handlers::search_navs))
        .route("/admin/navs", post(handlers::create_nav))
        .route(
            "/admin/navs/{id}",
            get(handlers::get_nav)
                .put(handlers::update_nav)
                .delete(handlers::delete_nav),
        )
        .with_state(state)
}
