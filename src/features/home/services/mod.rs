mod home_service;

pub use home_service::HomeService;
