use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryListQuery, CategoryListResponseDto, CategoryResponseDto, CategoryTreeDto,
    CreateCategoryDto, DeleteCategoryQuery, PublicCategoriesQuery, SubcategoryListQuery,
    UpdateCategoryDto,
};
use crate::features::categories::services::{CategoryFilter, CategoryService, ParentFilter};
use crate::shared::types::{ApiResponse, Pagination, SortKey};

fn parse_parent_filter(raw: Option<&str>) -> Result<Option<ParentFilter>> {
    match raw {
        None => Ok(None),
        Some("") | Some("null") | Some("none") => Ok(Some(ParentFilter::Root)),
        Some(value) => value
            .parse::<i64>()
            .map(|id| Some(ParentFilter::Of(id)))
            .map_err(|_| AppError::BadRequest(format!("Invalid parent_id filter: {}", value))),
    }
}

/// List categories as a forest with a pagination summary
#[utoipa::path(
    get,
    path = "/admin/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Category forest", body = ApiResponse<CategoryListResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<ApiResponse<CategoryListResponseDto>>> {
    let filter = CategoryFilter {
        is_public: query.is_public,
        parent: parse_parent_filter(query.parent_id.as_deref())?,
        level: query.level,
    };

    // The whole filtered set is fetched so the forest can be assembled;
    // the pagination block only summarizes the row count.
    let (categories, total) = service.get_all(&filter, None, None, query.sort).await?;
    let list = CategoryTreeDto::build_tree(categories);

    let response = CategoryListResponseDto {
        list,
        pagination: Pagination::new(query.page, query.size, total),
    };
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get a single category
#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

    Ok(Json(ApiResponse::success(Some(category.into()), None, None)))
}

/// List the direct children of a category
#[utoipa::path(
    get,
    path = "/admin/categories/{id}/children",
    params(("id" = i64, Path, description = "Parent category ID")),
    responses(
        (status = 200, description = "Direct children", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category_children(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    if service.get(id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Parent category {} not found",
            id
        )));
    }

    let children = service.get_children(id).await?;
    let dtos: Vec<CategoryResponseDto> = children.into_iter().map(|c| c.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation or hierarchy error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category.into()), None, None)),
    ))
}

/// Update a category, including moving it to a new parent
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation or hierarchy error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(category.into()), None, None)))
}

/// Delete a category, optionally cascading to its subtree
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID"),
        DeleteCategoryQuery
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Category still has children"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteCategoryQuery>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, query.cascade).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
        None,
    )))
}

/// List all root categories as a flat list
#[utoipa::path(
    get,
    path = "/admin/categories/roots",
    responses(
        (status = 200, description = "Root categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_root_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let filter = CategoryFilter {
        parent: Some(ParentFilter::Root),
        ..Default::default()
    };
    let (roots, _) = service.get_all(&filter, None, None, SortKey::SortOrder).await?;

    let dtos: Vec<CategoryResponseDto> = roots.into_iter().map(|c| c.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// List every subcategory (categories with a parent) as a flat list
#[utoipa::path(
    get,
    path = "/admin/categories/children",
    params(SubcategoryListQuery),
    responses(
        (status = 200, description = "All subcategories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_subcategories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<SubcategoryListQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let filter = CategoryFilter {
        is_public: query.is_public,
        ..Default::default()
    };
    let (categories, _) = service.get_all(&filter, None, None, SortKey::SortOrder).await?;

    let dtos: Vec<CategoryResponseDto> = categories
        .into_iter()
        .filter(|c| c.parent_id.is_some())
        .map(|c| c.into())
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// List public categories, flat or as a tree (no authentication)
#[utoipa::path(
    get,
    path = "/api/categories/public",
    params(PublicCategoriesQuery),
    responses(
        (status = 200, description = "Public categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_public_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<PublicCategoriesQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let filter = CategoryFilter {
        is_public: Some(true),
        ..Default::default()
    };
    let (categories, _) = service.get_all(&filter, None, None, SortKey::SortOrder).await?;

    let value = if query.tree {
        serde_json::to_value(CategoryTreeDto::build_tree(categories))
            .map_err(|e| AppError::Internal(e.to_string()))?
    } else {
        let dtos: Vec<CategoryResponseDto> = categories.into_iter().map(|c| c.into()).collect();
        serde_json::to_value(dtos).map_err(|e| AppError::Internal(e.to_string()))?
    };

    Ok(Json(ApiResponse::success(Some(value), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::routes;
    use crate::shared::test_helpers::{test_pool, with_admin_auth};
    use axum_test::TestServer;

    async fn test_server() -> TestServer {
        let pool = test_pool().await;
        let service = Arc::new(CategoryService::new(pool));
        let app = with_admin_auth(routes::protected_routes(service));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn category_crud_over_http() {
        let server = test_server().await;

        let created = server
            .post("/admin/categories")
            .json(&serde_json::json!({ "name": "dev" }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = created.json();
        assert_eq!(body["success"], true);
        let id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["level"], 1);

        let listed = server.get("/admin/categories").await;
        listed.assert_status_ok();
        let body: serde_json::Value = listed.json();
        assert_eq!(body["data"]["list"][0]["id"].as_i64().unwrap(), id);
        assert!(body["data"]["list"][0]["children"].is_array());
        assert_eq!(body["data"]["pagination"]["total"], 1);

        let missing_parent = server
            .post("/admin/categories")
            .json(&serde_json::json!({ "name": "x", "parent_id": 999 }))
            .await;
        missing_parent.assert_status(StatusCode::BAD_REQUEST);

        let deleted = server.delete(&format!("/admin/categories/{}", id)).await;
        deleted.assert_status_ok();

        let gone = server.get(&format!("/admin/categories/{}", id)).await;
        gone.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn overlong_name_is_rejected() {
        let server = test_server().await;

        let response = server
            .post("/admin/categories")
            .json(&serde_json::json!({ "name": "x".repeat(51) }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }
}
