pub mod nav_handler;

pub use nav_handler::{
    __path_create_nav, __path_delete_nav, __path_get_nav, __path_search_navs, __path_update_nav,
    create_nav, delete_nav, get_nav, search_navs, update_nav, NavState,
};
