use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::services::CategoryService;
use crate::features::navs::dtos::{
    CreateNavDto, NavListResponseDto, NavSearchQuery, NavWithCategoryDto, UpdateNavDto,
};
use crate::features::navs::models::Nav;
use crate::features::navs::services::{NavFilter, NavService};
use crate::shared::types::{ApiResponse, Pagination};

/// State for nav handlers
#[derive(Clone)]
pub struct NavState {
    pub nav_service: Arc<NavService>,
    pub category_service: Arc<CategoryService>,
}

impl NavState {
    /// Attach each nav's category name, fetching every category only once
    async fn with_category_names(&self, navs: Vec<Nav>) -> Result<Vec<NavWithCategoryDto>> {
        let mut names: HashMap<i64, Option<String>> = HashMap::new();
        for nav in &navs {
            if !names.contains_key(&nav.category_id) {
                let name = self
                    .category_service
                    .get(nav.category_id)
                    .await?
                    .map(|c| c.name);
                names.insert(nav.category_id, name);
            }
        }

        Ok(navs
            .into_iter()
            .map(|nav| {
                let category_name = names.get(&nav.category_id).cloned().flatten();
                NavWithCategoryDto {
                    nav: nav.into(),
                    category_name,
                }
            })
            .collect())
    }
}

/// Search navs with filters and pagination
#[utoipa::path(
    get,
    path = "/admin/navs/search",
    params(NavSearchQuery),
    responses(
        (status = 200, description = "Matching navs", body = ApiResponse<NavListResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "navs"
)]
pub async fn search_navs(
    State(state): State<NavState>,
    Query(query): Query<NavSearchQuery>,
) -> Result<Json<ApiResponse<NavListResponseDto>>> {
    let filter = NavFilter {
        is_public: query.is_public,
        category_id: query.category_id,
        keyword: query.keyword.clone(),
    };

    let (navs, total) = state
        .nav_service
        .search(&filter, query.page, query.size, query.sort)
        .await?;
    let list = state.with_category_names(navs).await?;

    let response = NavListResponseDto {
        list,
        pagination: Pagination::new(query.page, query.size, total),
    };
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get a single nav
#[utoipa::path(
    get,
    path = "/admin/navs/{id}",
    params(("id" = i64, Path, description = "Nav ID")),
    responses(
        (status = 200, description = "Nav found", body = ApiResponse<NavWithCategoryDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Nav not found")
    ),
    security(("bearer_auth" = [])),
    tag = "navs"
)]
pub async fn get_nav(
    State(state): State<NavState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NavWithCategoryDto>>> {
    let nav = state
        .nav_service
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Nav {} not found", id)))?;

    let mut dtos = state.with_category_names(vec![nav]).await?;
    let dto = dtos.remove(0);
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Create a nav
#[utoipa::path(
    post,
    path = "/admin/navs",
    request_body = CreateNavDto,
    responses(
        (status = 201, description = "Nav created", body = ApiResponse<NavWithCategoryDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Referenced category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "navs"
)]
pub async fn create_nav(
    State(state): State<NavState>,
    AppJson(dto): AppJson<CreateNavDto>,
) -> Result<(StatusCode, Json<ApiResponse<NavWithCategoryDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let nav = state.nav_service.create(dto).await?;
    let mut dtos = state.with_category_names(vec![nav]).await?;
    let dto = dtos.remove(0);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(dto), None, None)),
    ))
}

/// Update a nav
#[utoipa::path(
    put,
    path = "/admin/navs/{id}",
    params(("id" = i64, Path, description = "Nav ID")),
    request_body = UpdateNavDto,
    responses(
        (status = 200, description = "Nav updated", body = ApiResponse<NavWithCategoryDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Nav not found")
    ),
    security(("bearer_auth" = [])),
    tag = "navs"
)]
pub async fn update_nav(
    State(state): State<NavState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateNavDto>,
) -> Result<Json<ApiResponse<NavWithCategoryDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let nav = state.nav_service.update(id, dto).await?;
    let mut dtos = state.with_category_names(vec![nav]).await?;
    let dto = dtos.remove(0);
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Delete a nav
#[utoipa::path(
    delete,
    path = "/admin/navs/{id}",
    params(("id" = i64, Path, description = "Nav ID")),
    responses(
        (status = 200, description = "Nav deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Nav not found")
    ),
    security(("bearer_auth" = [])),
    tag = "navs"
)]
pub async fn delete_nav(
    State(state): State<NavState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.nav_service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Nav deleted".to_string()),
        None,
    )))
}
