use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::models::Category;
use crate::shared::constants::MAX_CATEGORY_DEPTH;
use crate::shared::types::SortKey;

const CATEGORY_COLUMNS: &str =
    "id, parent_id, name, description, sort_order, level, is_public, created_at";

/// Row filters accepted by [`CategoryService::get_all`]
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub is_public: Option<bool>,
    pub parent: Option<ParentFilter>,
    pub level: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Only categories without a parent
    Root,
    /// Only direct children of the given category
    Of(i64),
}

/// Store and hierarchy rules for navigation categories.
///
/// Mutations validate the tree invariants (parent existence, max depth,
/// no self-parenting, no cycles, deletion gated by children) before
/// touching the database.
pub struct CategoryService {
    pool: SqlitePool,
}

impl CategoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM nav_categories WHERE id = ?",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(category)
    }

    /// Filtered listing with the total row count. Pagination only applies
    /// when both `page` and `size` are given; the total always reflects
    /// the whole filtered set.
    pub async fn get_all(
        &self,
        filter: &CategoryFilter,
        page: Option<i64>,
        size: Option<i64>,
        sort: SortKey,
    ) -> Result<(Vec<Category>, i64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM nav_categories");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM nav_categories",
            CATEGORY_COLUMNS
        ));
        push_filter(&mut query, filter);
        query.push(match sort {
            SortKey::SortOrder => " ORDER BY sort_order ASC, created_at ASC",
            SortKey::CreatedAt => " ORDER BY created_at DESC",
        });
        if let (Some(page), Some(size)) = (page, size) {
            query
                .push(" LIMIT ")
                .push_bind(size)
                .push(" OFFSET ")
                .push_bind((page - 1) * size);
        }

        let categories = query
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((categories, total))
    }

    /// Direct (one-level) children, in listing order
    pub async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let filter = CategoryFilter {
            parent: Some(ParentFilter::Of(parent_id)),
            ..Default::default()
        };
        let (children, _) = self.get_all(&filter, None, None, SortKey::SortOrder).await?;
        Ok(children)
    }

    /// Root categories in landing-page order (`sort_order ASC, id ASC`)
    pub async fn home_roots(&self) -> Result<Vec<Category>> {
        let roots = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM nav_categories WHERE parent_id IS NULL ORDER BY sort_order ASC, id ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(roots)
    }

    /// Direct children in landing-page order (`sort_order ASC, id ASC`)
    pub async fn home_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let children = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM nav_categories WHERE parent_id = ? ORDER BY sort_order ASC, id ASC",
            CATEGORY_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(children)
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Category name must not be empty".to_string(),
            ));
        }

        let level = self.resolve_level(dto.parent_id).await?;
        let created_at = Utc::now();
        let description = normalize_description(dto.description);

        let result = sqlx::query(
            "INSERT INTO nav_categories (parent_id, name, description, sort_order, level, is_public, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.parent_id)
        .bind(&name)
        .bind(&description)
        .bind(dto.sort_order)
        .bind(level)
        .bind(dto.is_public)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert category: {:?}", e);
            AppError::Database(e)
        })?;

        let category = Category {
            id: result.last_insert_rowid(),
            parent_id: dto.parent_id,
            name,
            description,
            sort_order: dto.sort_order,
            level,
            is_public: dto.is_public,
            created_at,
        };
        tracing::info!("Category created: id={}, level={}", category.id, level);
        Ok(category)
    }

    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<Category> {
        let mut category = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(name) = dto.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation(
                    "Category name must not be empty".to_string(),
                ));
            }
            category.name = name;
        }
        if let Some(description) = dto.description {
            category.description = normalize_description(Some(description));
        }
        if let Some(sort_order) = dto.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(is_public) = dto.is_public {
            category.is_public = is_public;
        }

        let mut relevel = false;
        if let Some(new_parent_id) = dto.parent_id {
            if new_parent_id != category.parent_id {
                self.validate_reparent(&category, new_parent_id).await?;
                category.level = self.resolve_level(new_parent_id).await?;
                category.parent_id = new_parent_id;
                relevel = true;
            }
        }

        sqlx::query(
            "UPDATE nav_categories SET parent_id = ?, name = ?, description = ?, \
             sort_order = ?, level = ?, is_public = ? WHERE id = ?",
        )
        .bind(category.parent_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.level)
        .bind(category.is_public)
        .bind(category.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if relevel {
            self.relevel_subtree(category.id, category.level).await?;
        }

        Ok(category)
    }

    /// Delete a category. Refuses when children exist unless `cascade` is
    /// requested, in which case the whole subtree (and the navs attached
    /// to it) is removed.
    pub async fn delete(&self, id: i64, cascade: bool) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        let children = self.get_children(id).await?;
        if !children.is_empty() && !cascade {
            return Err(AppError::HasChildren(
                "Category has subcategories and cannot be deleted".to_string(),
            ));
        }

        // Children-before-parents order keeps the self-referential foreign
        // key satisfied while rows disappear.
        let mut doomed = self.descendant_ids(id).await?;
        doomed.reverse();
        doomed.push(id);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for category_id in &doomed {
            sqlx::query("DELETE FROM navs WHERE category_id = ?")
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            sqlx::query("DELETE FROM nav_categories WHERE id = ?")
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Category deleted: id={}, cascade={}", id, cascade);
        Ok(())
    }

    /// Every id in the subtree below `id`, parents before their children.
    /// Children are re-fetched per node; cheap at depth <= 5.
    pub async fn descendant_ids(&self, id: i64) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.get_children(current).await? {
                ids.push(child.id);
                stack.push(child.id);
            }
        }
        Ok(ids)
    }

    /// Level of a category under the given parent: parent.level + 1, or 1
    /// for roots. Fails when the parent is missing or the depth cap would
    /// be exceeded.
    async fn resolve_level(&self, parent_id: Option<i64>) -> Result<i64> {
        let Some(parent_id) = parent_id else {
            return Ok(1);
        };

        let parent = self.get(parent_id).await?.ok_or_else(|| {
            AppError::ParentNotFound(format!("Parent category {} does not exist", parent_id))
        })?;

        let level = parent.level + 1;
        if level > MAX_CATEGORY_DEPTH {
            return Err(AppError::DepthExceeded(format!(
                "Category nesting is limited to {} levels",
                MAX_CATEGORY_DEPTH
            )));
        }
        Ok(level)
    }

    async fn validate_reparent(
        &self,
        category: &Category,
        new_parent_id: Option<i64>,
    ) -> Result<()> {
        let Some(new_parent_id) = new_parent_id else {
            return Ok(());
        };

        if new_parent_id == category.id {
            return Err(AppError::InvalidParent(
                "A category cannot be its own parent".to_string(),
            ));
        }

        if self
            .descendant_ids(category.id)
            .await?
            .contains(&new_parent_id)
        {
            return Err(AppError::CyclicHierarchy(
                "Cannot move a category into its own subtree".to_string(),
            ));
        }

        Ok(())
    }

    /// Rewrite the cached levels below a moved category so every child
    /// stays at parent.level + 1.
    async fn relevel_subtree(&self, root_id: i64, root_level: i64) -> Result<()> {
        let mut stack = vec![(root_id, root_level)];
        while let Some((id, level)) = stack.pop() {
            for child in self.get_children(id).await? {
                let child_level = level + 1;
                if child.level != child_level {
                    sqlx::query("UPDATE nav_categories SET level = ? WHERE id = ?")
                        .bind(child_level)
                        .bind(child.id)
                        .execute(&self.pool)
                        .await
                        .map_err(AppError::Database)?;
                }
                stack.push((child.id, child_level));
            }
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &CategoryFilter) {
    let mut first = true;
    if let Some(is_public) = filter.is_public {
        push_separator(query, &mut first);
        query.push("is_public = ").push_bind(is_public);
    }
    match filter.parent {
        Some(ParentFilter::Root) => {
            push_separator(query, &mut first);
            query.push("parent_id IS NULL");
        }
        Some(ParentFilter::Of(parent_id)) => {
            push_separator(query, &mut first);
            query.push("parent_id = ").push_bind(parent_id);
        }
        None => {}
    }
    if let Some(level) = filter.level {
        push_separator(query, &mut first);
        query.push("level = ").push_bind(level);
    }
}

fn push_separator(query: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    query.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_pool;

    async fn test_service() -> CategoryService {
        CategoryService::new(test_pool().await)
    }

    fn create_dto(name: &str, parent_id: Option<i64>) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            description: None,
            parent_id,
            sort_order: 0,
            is_public: true,
        }
    }

    fn reparent_dto(parent_id: Option<i64>) -> UpdateCategoryDto {
        UpdateCategoryDto {
            name: None,
            description: None,
            parent_id: Some(parent_id),
            sort_order: None,
            is_public: None,
        }
    }

    #[tokio::test]
    async fn root_category_gets_level_one() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();

        assert_eq!(root.level, 1);
        assert_eq!(root.parent_id, None);
    }

    #[tokio::test]
    async fn child_level_is_parent_level_plus_one() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();
        let child = service
            .create(create_dto("tools", Some(root.id)))
            .await
            .unwrap();

        assert_eq!(child.level, root.level + 1);
    }

    #[tokio::test]
    async fn sixth_level_is_rejected() {
        let service = test_service().await;
        let mut parent_id = None;
        for depth in 1..=5 {
            let category = service
                .create(create_dto(&format!("level-{}", depth), parent_id))
                .await
                .unwrap();
            assert_eq!(category.level, depth);
            parent_id = Some(category.id);
        }

        let err = service
            .create(create_dto("level-6", parent_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DepthExceeded(_)));
    }

    #[tokio::test]
    async fn missing_parent_is_rejected() {
        let service = test_service().await;
        let err = service
            .create(create_dto("orphan", Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn self_parent_is_rejected() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();

        let err = service
            .update(root.id, reparent_dto(Some(root.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidParent(_)));
    }

    #[tokio::test]
    async fn reparent_to_grandchild_is_rejected() {
        let service = test_service().await;
        let a = service.create(create_dto("a", None)).await.unwrap();
        let b = service.create(create_dto("b", Some(a.id))).await.unwrap();
        let c = service.create(create_dto("c", Some(b.id))).await.unwrap();

        let err = service
            .update(a.id, reparent_dto(Some(c.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CyclicHierarchy(_)));
    }

    #[tokio::test]
    async fn reparent_to_unrelated_category_recomputes_levels() {
        let service = test_service().await;
        let a = service.create(create_dto("a", None)).await.unwrap();
        let b = service.create(create_dto("b", Some(a.id))).await.unwrap();
        let c = service.create(create_dto("c", Some(b.id))).await.unwrap();
        let other = service.create(create_dto("other", None)).await.unwrap();

        let moved = service
            .update(b.id, reparent_dto(Some(other.id)))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(other.id));
        assert_eq!(moved.level, 2);

        // The subtree below the moved category keeps parent.level + 1
        let c = service.get(c.id).await.unwrap().unwrap();
        assert_eq!(c.level, 3);
    }

    #[tokio::test]
    async fn reparent_to_root_resets_level() {
        let service = test_service().await;
        let a = service.create(create_dto("a", None)).await.unwrap();
        let b = service.create(create_dto("b", Some(a.id))).await.unwrap();

        let moved = service.update(b.id, reparent_dto(None)).await.unwrap();
        assert_eq!(moved.parent_id, None);
        assert_eq!(moved.level, 1);
    }

    #[tokio::test]
    async fn delete_with_children_requires_cascade() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();
        let child = service
            .create(create_dto("tools", Some(root.id)))
            .await
            .unwrap();
        let grandchild = service
            .create(create_dto("linters", Some(child.id)))
            .await
            .unwrap();

        let err = service.delete(root.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::HasChildren(_)));

        service.delete(root.id, true).await.unwrap();
        assert!(service.get(root.id).await.unwrap().is_none());
        assert!(service.get(child.id).await.unwrap().is_none());
        assert!(service.get(grandchild.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_leaf_without_cascade_succeeds() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();

        service.delete(root.id, false).await.unwrap();
        assert!(service.get(root.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_category_is_not_found() {
        let service = test_service().await;
        let err = service.delete(42, false).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn root_filter_returns_only_roots() {
        let service = test_service().await;
        let a = service.create(create_dto("a", None)).await.unwrap();
        let b = service.create(create_dto("b", None)).await.unwrap();
        service.create(create_dto("a1", Some(a.id))).await.unwrap();
        service.create(create_dto("b1", Some(b.id))).await.unwrap();

        let filter = CategoryFilter {
            parent: Some(ParentFilter::Root),
            ..Default::default()
        };
        let (roots, total) = service
            .get_all(&filter, None, None, SortKey::SortOrder)
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert!(roots.iter().all(|c| c.parent_id.is_none()));
    }

    #[tokio::test]
    async fn pagination_slices_but_counts_everything() {
        let service = test_service().await;
        for i in 0..5 {
            service
                .create(create_dto(&format!("cat-{}", i), None))
                .await
                .unwrap();
        }

        let (page, total) = service
            .get_all(
                &CategoryFilter::default(),
                Some(2),
                Some(2),
                SortKey::SortOrder,
            )
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn level_filter_matches_exactly() {
        let service = test_service().await;
        let root = service.create(create_dto("root", None)).await.unwrap();
        service
            .create(create_dto("child", Some(root.id)))
            .await
            .unwrap();

        let filter = CategoryFilter {
            level: Some(2),
            ..Default::default()
        };
        let (rows, total) = service
            .get_all(&filter, None, None, SortKey::SortOrder)
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(rows[0].name, "child");
    }

    #[tokio::test]
    async fn duplicate_sibling_names_are_allowed() {
        let service = test_service().await;
        let root = service.create(create_dto("dev", None)).await.unwrap();
        service
            .create(create_dto("tools", Some(root.id)))
            .await
            .unwrap();
        // Sibling name uniqueness is intentionally not enforced
        service
            .create(create_dto("tools", Some(root.id)))
            .await
            .unwrap();

        let children = service.get_children(root.id).await.unwrap();
        assert_eq!(children.len(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let service = test_service().await;
        let err = service.create(create_dto("   ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
