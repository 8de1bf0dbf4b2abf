mod nav_service;

pub use nav_service::{NavFilter, NavService};
