pub mod auth_handler;

pub use auth_handler::{
    __path_login, __path_logout, __path_profile, __path_register, __path_verify, login, logout,
    profile, register, verify,
};
