use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::MaybeAuthenticated;
use crate::features::home::dtos::{HomeCategoryDto, HomeQuery};
use crate::features::home::services::HomeService;
use crate::shared::types::ApiResponse;

/// Landing page payload: root categories with their subcategories and
/// visible navs. Works for anonymous callers; a valid bearer token
/// switches to the full view.
#[utoipa::path(
    get,
    path = "/api/home",
    params(HomeQuery),
    responses(
        (status = 200, description = "Landing page payload", body = ApiResponse<Vec<HomeCategoryDto>>),
    ),
    tag = "home"
)]
pub async fn get_home(
    MaybeAuthenticated(user): MaybeAuthenticated,
    State(service): State<Arc<HomeService>>,
    Query(query): Query<HomeQuery>,
) -> Result<Json<ApiResponse<Vec<HomeCategoryDto>>>> {
    let payload = service
        .compose(user.is_some(), query.page, query.size)
        .await?;
    Ok(Json(ApiResponse::success(Some(payload), None, None)))
}
