use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::constants::CATEGORY_PAGE_SIZE;
use crate::shared::types::{Pagination, SortKey};

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 50, message = "Category name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 200, message = "Category description must not exceed 200 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Parent category id; absent for a root category
    #[serde(default)]
    pub parent_id: Option<i64>,

    #[validate(range(min = 0, message = "Sort order must be a non-negative integer"))]
    #[serde(default)]
    pub sort_order: i64,

    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

/// Request DTO for updating a category. Absent fields are left unchanged;
/// `parent_id: null` moves the category to the root level.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 50, message = "Category name must be 1-50 characters"))]
    #[serde(default)]
    pub name: Option<String>,

    #[validate(length(max = 200, message = "Category description must not exceed 200 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    #[schema(value_type = Option<i64>)]
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<i64>>,

    #[validate(range(min = 0, message = "Sort order must be a non-negative integer"))]
    #[serde(default)]
    pub sort_order: Option<i64>,

    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Distinguishes an absent `parent_id` key from an explicit `null`
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Query params for the category listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryListQuery {
    /// Page number reported back in the pagination block
    #[serde(default = "default_page")]
    pub page: i64,

    /// Page size reported back in the pagination block
    #[serde(default = "default_size")]
    pub size: i64,

    /// Parent id filter; "null", "none" or empty matches root categories
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Exact level filter (1-5)
    #[serde(default)]
    pub level: Option<i64>,

    /// Visibility filter
    #[serde(default)]
    pub is_public: Option<bool>,

    #[serde(default)]
    pub sort: SortKey,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    CATEGORY_PAGE_SIZE
}

/// Query params for the flat all-subcategories listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SubcategoryListQuery {
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Query params for the public category listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PublicCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

/// Query params for category deletion
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DeleteCategoryQuery {
    /// Also delete every descendant category
    #[serde(default)]
    pub cascade: bool,
}

/// Response DTO for a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub level: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            description: c.description,
            sort_order: c.sort_order,
            level: c.level,
            is_public: c.is_public,
            created_at: c.created_at,
        }
    }
}

/// Response DTO for a category tree node. `children` is always present,
/// empty for leaves, so serialization is uniform.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub level: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Assemble a forest from a flat, pre-sorted list of categories.
    ///
    /// A node is a root when it has no parent or when its parent was not
    /// part of the input (a filtered subset turns such nodes into de facto
    /// roots). Children keep the order they had in the input list.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeDto> {
        let ids: std::collections::HashSet<i64> = categories.iter().map(|c| c.id).collect();

        let mut roots: Vec<Category> = Vec::new();
        let mut children_of: HashMap<i64, Vec<Category>> = HashMap::new();
        for category in categories {
            match category.parent_id {
                Some(parent_id) if ids.contains(&parent_id) => {
                    children_of.entry(parent_id).or_default().push(category);
                }
                _ => roots.push(category),
            }
        }

        roots
            .into_iter()
            .map(|root| Self::build_node(root, &mut children_of))
            .collect()
    }

    fn build_node(category: Category, children_of: &mut HashMap<i64, Vec<Category>>) -> Self {
        let children = children_of
            .remove(&category.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::build_node(child, children_of))
            .collect();

        CategoryTreeDto {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            description: category.description,
            sort_order: category.sort_order,
            level: category.level,
            is_public: category.is_public,
            created_at: category.created_at,
            children,
        }
    }
}

/// Response DTO for the category listing: the assembled forest plus a
/// pagination summary over the filtered row count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryListResponseDto {
    pub list: Vec<CategoryTreeDto>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>, level: i64) -> Category {
        Category {
            id,
            parent_id,
            name: format!("category-{}", id),
            description: None,
            sort_order: 0,
            level,
            is_public: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(CategoryTreeDto::build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn flat_input_yields_one_root_per_category() {
        let tree = CategoryTreeDto::build_tree(vec![
            category(1, None, 1),
            category(2, None, 1),
            category(3, None, 1),
        ]);

        assert_eq!(tree.len(), 3);
        assert!(tree.iter().all(|node| node.children.is_empty()));
    }

    #[test]
    fn chain_of_depth_five_nests_fully() {
        let tree = CategoryTreeDto::build_tree(vec![
            category(1, None, 1),
            category(2, Some(1), 2),
            category(3, Some(2), 3),
            category(4, Some(3), 4),
            category(5, Some(4), 5),
        ]);

        assert_eq!(tree.len(), 1);
        let mut node = &tree[0];
        let mut depth = 1;
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 5);
        assert_eq!(node.id, 5);
        assert!(node.children.is_empty());
    }

    #[test]
    fn node_with_filtered_out_parent_becomes_root() {
        // Parent 1 is not part of the (filtered) input set
        let tree = CategoryTreeDto::build_tree(vec![category(2, Some(1), 2), category(3, Some(2), 3)]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 2);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, 3);
    }

    #[test]
    fn children_keep_input_order() {
        let tree = CategoryTreeDto::build_tree(vec![
            category(1, None, 1),
            category(5, Some(1), 2),
            category(3, Some(1), 2),
            category(4, Some(1), 2),
        ]);

        let order: Vec<i64> = tree[0].children.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![5, 3, 4]);
    }

    #[test]
    fn every_node_carries_a_children_list() {
        let json = serde_json::to_value(CategoryTreeDto::build_tree(vec![
            category(1, None, 1),
            category(2, Some(1), 2),
        ]))
        .unwrap();

        assert!(json[0]["children"].is_array());
        assert!(json[0]["children"][0]["children"].is_array());
    }
}
