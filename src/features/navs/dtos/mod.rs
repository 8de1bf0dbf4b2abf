mod nav_dto;

pub use nav_dto::{
    CreateNavDto, NavListResponseDto, NavResponseDto, NavSearchQuery, NavWithCategoryDto,
    UpdateNavDto,
};
