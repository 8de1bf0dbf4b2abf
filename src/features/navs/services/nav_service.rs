use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::core::error::{AppError, Result};
use crate::features::navs::dtos::{CreateNavDto, UpdateNavDto};
use crate::features::navs::models::Nav;
use crate::shared::types::SortKey;

const NAV_COLUMNS: &str =
    "id, category_id, title, url, description, icon, sort_order, is_public, created_at";

/// Row filters accepted by [`NavService::search`]
#[derive(Debug, Clone, Default)]
pub struct NavFilter {
    pub is_public: Option<bool>,
    pub category_id: Option<i64>,
    /// Substring match against title or description
    pub keyword: Option<String>,
}

/// Store for navigation links
pub struct NavService {
    pool: SqlitePool,
}

impl NavService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Nav>> {
        let nav = sqlx::query_as::<_, Nav>(&format!(
            "SELECT {} FROM navs WHERE id = ?",
            NAV_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(nav)
    }

    /// Paginated search with the total row count. `offset = (page-1)*size`;
    /// clamping belongs to the calling boundary, not here.
    pub async fn search(
        &self,
        filter: &NavFilter,
        page: i64,
        size: i64,
        sort: SortKey,
    ) -> Result<(Vec<Nav>, i64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM navs");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut query = QueryBuilder::new(format!("SELECT {} FROM navs", NAV_COLUMNS));
        push_filter(&mut query, filter);
        query.push(match sort {
            SortKey::SortOrder => " ORDER BY sort_order ASC, created_at ASC",
            SortKey::CreatedAt => " ORDER BY created_at DESC",
        });
        query
            .push(" LIMIT ")
            .push_bind(size)
            .push(" OFFSET ")
            .push_bind((page - 1) * size);

        let navs = query
            .build_query_as::<Nav>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((navs, total))
    }

    pub async fn create(&self, dto: CreateNavDto) -> Result<Nav> {
        self.assert_category_exists(dto.category_id).await?;

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO navs (category_id, title, url, description, icon, sort_order, is_public, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.category_id)
        .bind(&dto.title)
        .bind(&dto.url)
        .bind(&dto.description)
        .bind(&dto.icon)
        .bind(dto.sort_order)
        .bind(dto.is_public)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert nav: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Nav {
            id: result.last_insert_rowid(),
            category_id: dto.category_id,
            title: dto.title,
            url: dto.url,
            description: dto.description,
            icon: dto.icon,
            sort_order: dto.sort_order,
            is_public: dto.is_public,
            created_at,
        })
    }

    pub async fn update(&self, id: i64, dto: UpdateNavDto) -> Result<Nav> {
        let mut nav = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Nav {} not found", id)))?;

        if let Some(category_id) = dto.category_id {
            self.assert_category_exists(category_id).await?;
            nav.category_id = category_id;
        }
        if let Some(title) = dto.title {
            nav.title = title;
        }
        if let Some(url) = dto.url {
            nav.url = url;
        }
        if let Some(description) = dto.description {
            nav.description = Some(description);
        }
        if let Some(icon) = dto.icon {
            nav.icon = Some(icon);
        }
        if let Some(sort_order) = dto.sort_order {
            nav.sort_order = sort_order;
        }
        if let Some(is_public) = dto.is_public {
            nav.is_public = is_public;
        }

        sqlx::query(
            "UPDATE navs SET category_id = ?, title = ?, url = ?, description = ?, \
             icon = ?, sort_order = ?, is_public = ? WHERE id = ?",
        )
        .bind(nav.category_id)
        .bind(&nav.title)
        .bind(&nav.url)
        .bind(&nav.description)
        .bind(&nav.icon)
        .bind(nav.sort_order)
        .bind(nav.is_public)
        .bind(nav.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(nav)
    }

    /// Delete a nav. Unconditional, navs have no children.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Nav {} not found", id)));
        }

        sqlx::query("DELETE FROM navs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    async fn assert_category_exists(&self, category_id: i64) -> Result<()> {
        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM nav_categories WHERE id = ?")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if exists == 0 {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &NavFilter) {
    let mut first = true;
    if let Some(is_public) = filter.is_public {
        push_separator(query, &mut first);
        query.push("is_public = ").push_bind(is_public);
    }
    if let Some(category_id) = filter.category_id {
        push_separator(query, &mut first);
        query.push("category_id = ").push_bind(category_id);
    }
    if let Some(keyword) = &filter.keyword {
        if !keyword.is_empty() {
            let pattern = format!("%{}%", keyword);
            push_separator(query, &mut first);
            query
                .push("(title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn push_separator(query: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    query.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}
