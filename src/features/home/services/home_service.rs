use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::services::CategoryService;
use crate::features::home::dtos::{HomeCategoryDto, HomeSubcategoryDto};
use crate::features::navs::dtos::NavResponseDto;
use crate::features::navs::services::{NavFilter, NavService};
use crate::shared::constants::HOME_MAX_PAGE_SIZE;
use crate::shared::types::{Pagination, SortKey};

/// Composes the landing page payload: root categories, their
/// subcategories, and each subcategory's visible navs.
///
/// Unauthenticated callers see subcategory entries but no navs under a
/// non-public subcategory, and only public navs elsewhere. Any store
/// failure propagates, partial payloads are never returned.
pub struct HomeService {
    categories: Arc<CategoryService>,
    navs: Arc<NavService>,
}

impl HomeService {
    pub fn new(categories: Arc<CategoryService>, navs: Arc<NavService>) -> Self {
        Self { categories, navs }
    }

    pub async fn compose(
        &self,
        authenticated: bool,
        page: i64,
        size: i64,
    ) -> Result<Vec<HomeCategoryDto>> {
        let page = page.max(1);
        let size = size.clamp(1, HOME_MAX_PAGE_SIZE);

        let roots = self.categories.home_roots().await?;
        let mut payload = Vec::with_capacity(roots.len());

        for root in roots {
            let children = self.categories.home_children(root.id).await?;
            let mut subcategories = Vec::with_capacity(children.len());

            for child in children {
                if !authenticated && !child.is_public {
                    subcategories.push(HomeSubcategoryDto::hidden(child, page, size));
                    continue;
                }

                let filter = NavFilter {
                    category_id: Some(child.id),
                    is_public: if authenticated { None } else { Some(true) },
                    keyword: None,
                };
                let (navs, total) = self
                    .navs
                    .search(&filter, page, size, SortKey::SortOrder)
                    .await?;

                let navs: Vec<NavResponseDto> = navs.into_iter().map(|n| n.into()).collect();
                subcategories.push(HomeSubcategoryDto::new(
                    child,
                    navs,
                    Pagination::new(page, size, total),
                ));
            }

            payload.push(HomeCategoryDto::new(root, subcategories));
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::dtos::CreateCategoryDto;
    use crate::features::navs::dtos::CreateNavDto;
    use crate::shared::test_helpers::test_pool;

    async fn test_service() -> (HomeService, Arc<CategoryService>, Arc<NavService>) {
        let pool = test_pool().await;
        let categories = Arc::new(CategoryService::new(pool.clone()));
        let navs = Arc::new(NavService::new(pool));
        (
            HomeService::new(Arc::clone(&categories), Arc::clone(&navs)),
            categories,
            navs,
        )
    }

    async fn seed_category(
        categories: &CategoryService,
        name: &str,
        parent_id: Option<i64>,
        sort_order: i64,
        is_public: bool,
    ) -> i64 {
        categories
            .create(CreateCategoryDto {
                name: name.to_string(),
                description: None,
                parent_id,
                sort_order,
                is_public,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_nav(navs: &NavService, category_id: i64, title: &str, is_public: bool) -> i64 {
        navs.create(CreateNavDto {
            category_id,
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            description: None,
            icon: None,
            sort_order: 0,
            is_public,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn anonymous_view_hides_private_navs() {
        let (home, categories, navs) = test_service().await;

        // Root -> public subcategory -> deeper child, with one public and
        // one private nav on the subcategory
        let root = seed_category(&categories, "root", None, 0, true).await;
        let sub = seed_category(&categories, "sub", Some(root), 0, true).await;
        let _deep = seed_category(&categories, "deep", Some(sub), 0, true).await;
        let public_nav = seed_nav(&navs, sub, "public-nav", true).await;
        let _private_nav = seed_nav(&navs, sub, "private-nav", false).await;

        let payload = home.compose(false, 1, 9).await.unwrap();

        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].id, root);
        assert_eq!(payload[0].children.len(), 1);

        let sub_dto = &payload[0].children[0];
        assert_eq!(sub_dto.id, sub);
        assert_eq!(sub_dto.navs.len(), 1);
        assert_eq!(sub_dto.navs[0].id, public_nav);
        assert_eq!(sub_dto.pagination.total, 1);
    }

    #[tokio::test]
    async fn authenticated_view_includes_private_navs() {
        let (home, categories, navs) = test_service().await;

        let root = seed_category(&categories, "root", None, 0, true).await;
        let sub = seed_category(&categories, "sub", Some(root), 0, true).await;
        seed_nav(&navs, sub, "public-nav", true).await;
        seed_nav(&navs, sub, "private-nav", false).await;

        let payload = home.compose(true, 1, 9).await.unwrap();
        let sub_dto = &payload[0].children[0];

        assert_eq!(sub_dto.navs.len(), 2);
        assert_eq!(sub_dto.pagination.total, 2);
    }

    #[tokio::test]
    async fn anonymous_view_withholds_navs_of_private_subcategory() {
        let (home, categories, navs) = test_service().await;

        let root = seed_category(&categories, "root", None, 0, true).await;
        let hidden = seed_category(&categories, "hidden", Some(root), 0, false).await;
        seed_nav(&navs, hidden, "public-nav", true).await;

        let payload = home.compose(false, 1, 9).await.unwrap();
        let hidden_dto = &payload[0].children[0];

        assert_eq!(hidden_dto.id, hidden);
        assert!(hidden_dto.navs.is_empty());
        assert_eq!(hidden_dto.pagination.total, 0);
        assert_eq!(hidden_dto.pagination.pages, 0);

        // The same subcategory is fully visible once authenticated
        let payload = home.compose(true, 1, 9).await.unwrap();
        assert_eq!(payload[0].children[0].navs.len(), 1);
    }

    #[tokio::test]
    async fn view_is_truncated_at_two_levels() {
        let (home, categories, _navs) = test_service().await;

        let root = seed_category(&categories, "root", None, 0, true).await;
        let sub = seed_category(&categories, "sub", Some(root), 0, true).await;
        let deep = seed_category(&categories, "deep", Some(sub), 0, true).await;

        let payload = home.compose(true, 1, 9).await.unwrap();

        assert_eq!(payload.len(), 1);
        let ids: Vec<i64> = payload[0].children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![sub]);
        assert!(!ids.contains(&deep));
    }

    #[tokio::test]
    async fn roots_are_ordered_by_sort_order_then_id() {
        let (home, categories, _navs) = test_service().await;

        let b = seed_category(&categories, "b", None, 1, true).await;
        let c = seed_category(&categories, "c", None, 0, true).await;
        let d = seed_category(&categories, "d", None, 0, true).await;

        let payload = home.compose(true, 1, 9).await.unwrap();
        let order: Vec<i64> = payload.iter().map(|c| c.id).collect();

        // sort_order 0 first (ties broken by id), then sort_order 1
        assert_eq!(order, vec![c, d, b]);
    }

    #[tokio::test]
    async fn page_and_size_are_clamped() {
        let (home, categories, navs) = test_service().await;

        let root = seed_category(&categories, "root", None, 0, true).await;
        let sub = seed_category(&categories, "sub", Some(root), 0, true).await;
        for i in 0..3 {
            seed_nav(&navs, sub, &format!("nav-{}", i), true).await;
        }

        // size far above the cap clamps to 50, page 0 clamps to 1
        let payload = home.compose(true, 0, 500).await.unwrap();
        let sub_dto = &payload[0].children[0];

        assert_eq!(sub_dto.pagination.page, 1);
        assert_eq!(sub_dto.pagination.size, 50);
        assert_eq!(sub_dto.navs.len(), 3);

        // size 0 clamps to 1 and pages reflect the clamped size
        let payload = home.compose(true, 1, 0).await.unwrap();
        let sub_dto = &payload[0].children[0];

        assert_eq!(sub_dto.pagination.size, 1);
        assert_eq!(sub_dto.navs.len(), 1);
        assert_eq!(sub_dto.pagination.pages, 3);
    }
}
