use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::home::{dtos as home_dtos, handlers as home_handlers};
use crate::features::navs::{dtos as navs_dtos, handlers as navs_handlers};
use crate::shared::types::{ApiResponse, Meta, Pagination, SortKey};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::profile,
        auth::handlers::verify,
        auth::handlers::register,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::get_category_children,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::list_root_categories,
        categories_handlers::list_subcategories,
        categories_handlers::list_public_categories,
        // Navs
        navs_handlers::search_navs,
        navs_handlers::get_nav,
        navs_handlers::create_nav,
        navs_handlers::update_nav,
        navs_handlers::delete_nav,
        // Home
        home_handlers::home_handler::get_home,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Pagination,
            SortKey,
            // Auth
            auth::model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::RegisterRequestDto,
            auth_dtos::UserResponseDto,
            auth_dtos::TokenResponseDto,
            auth_dtos::LoginResponseDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::UserResponseDto>,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryListResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryListResponseDto>,
            // Navs
            navs_dtos::CreateNavDto,
            navs_dtos::UpdateNavDto,
            navs_dtos::NavResponseDto,
            navs_dtos::NavWithCategoryDto,
            navs_dtos::NavListResponseDto,
            ApiResponse<navs_dtos::NavWithCategoryDto>,
            ApiResponse<navs_dtos::NavListResponseDto>,
            // Home
            home_dtos::HomeSubcategoryDto,
            home_dtos::HomeCategoryDto,
            ApiResponse<Vec<home_dtos::HomeCategoryDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and console accounts"),
        (name = "categories", description = "Hierarchical navigation categories"),
        (name = "navs", description = "Navigation links"),
        (name = "home", description = "Public landing page payload"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Navhub API",
        version = "0.1.0",
        description = "API documentation for the Navhub link directory",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
