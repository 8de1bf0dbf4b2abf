use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::core::middleware;
use crate::features::auth::services::AuthService;
use crate::features::home::handlers;
use crate::features::home::services::HomeService;

/// Landing page route. Public, but a valid bearer token upgrades the
/// caller to the authenticated view.
pub fn routes(service: Arc<HomeService>, auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/home", get(handlers::get_home))
        .route_layer(from_fn_with_state(
            auth_service,
            middleware::optional_auth_middleware,
        ))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::features::auth::dtos::LoginRequestDto;
    use crate::features::auth::services::{TokenService, UserService};
    use crate::features::categories::dtos::CreateCategoryDto;
    use crate::features::categories::CategoryService;
    use crate::features::navs::dtos::CreateNavDto;
    use crate::features::navs::NavService;
    use crate::shared::test_helpers::test_pool;
    use axum_test::TestServer;
    use std::time::Duration;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
            remember_token_ttl: Duration::from_secs(7200),
            jwt_leeway: Duration::from_secs(0),
            admin_initial_password: "123456".to_string(),
        }
    }

    #[tokio::test]
    async fn bearer_token_upgrades_home_view() {
        let pool = test_pool().await;
        let config = test_config();
        let auth = Arc::new(AuthService::new(
            Arc::new(UserService::new(pool.clone())),
            Arc::new(TokenService::new(config.clone())),
            config,
        ));
        auth.bootstrap_admin().await.unwrap();

        let categories = Arc::new(CategoryService::new(pool.clone()));
        let navs = Arc::new(NavService::new(pool));

        let root = categories
            .create(CreateCategoryDto {
                name: "root".to_string(),
                description: None,
                parent_id: None,
                sort_order: 0,
                is_public: true,
            })
            .await
            .unwrap();
        let sub = categories
            .create(CreateCategoryDto {
                name: "sub".to_string(),
                description: None,
                parent_id: Some(root.id),
                sort_order: 0,
                is_public: true,
            })
            .await
            .unwrap();
        for (title, is_public) in [("visible", true), ("hidden", false)] {
            navs.create(CreateNavDto {
                category_id: sub.id,
                title: title.to_string(),
                url: format!("https://example.com/{}", title),
                description: None,
                icon: None,
                sort_order: 0,
                is_public,
            })
            .await
            .unwrap();
        }

        let home = Arc::new(HomeService::new(categories, navs));
        let server = TestServer::new(routes(home, Arc::clone(&auth))).unwrap();

        let anonymous = server.get("/api/home").await;
        anonymous.assert_status_ok();
        let body: serde_json::Value = anonymous.json();
        let subcategory = &body["data"][0]["children"][0];
        assert_eq!(subcategory["navs"].as_array().unwrap().len(), 1);
        assert_eq!(subcategory["pagination"]["total"], 1);

        let login = auth
            .login(LoginRequestDto {
                username: "admin".to_string(),
                password: "123456".to_string(),
                remember_me: false,
            })
            .await
            .unwrap();

        let authenticated = server
            .get("/api/home")
            .authorization_bearer(&login.token.access_token)
            .await;
        authenticated.assert_status_ok();
        let body: serde_json::Value = authenticated.json();
        let subcategory = &body["data"][0]["children"][0];
        assert_eq!(subcategory["navs"].as_array().unwrap().len(), 2);

        // A garbage token falls back to the anonymous view instead of 401
        let garbage = server
            .get("/api/home")
            .authorization_bearer("not-a-token")
            .await;
        garbage.assert_status_ok();
        let body: serde_json::Value = garbage.json();
        assert_eq!(
            body["data"][0]["children"][0]["navs"].as_array().unwrap().len(),
            1
        );
    }
}
