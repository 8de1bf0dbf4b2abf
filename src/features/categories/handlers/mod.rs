pub mod category_handler;

pub use category_handler::{
    __path_create_category, __path_delete_category, __path_get_category,
    __path_get_category_children, __path_list_categories, __path_list_public_categories,
    __path_list_root_categories, __path_list_subcategories, __path_update_category,
    create_category, delete_category, get_category, get_category_children, list_categories,
    list_public_categories, list_root_categories, list_subcategories, update_category,
};
