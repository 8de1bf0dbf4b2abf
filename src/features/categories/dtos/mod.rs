mod category_dto;

pub use category_dto::{
    CategoryListQuery, CategoryListResponseDto, CategoryResponseDto, CategoryTreeDto,
    CreateCategoryDto, DeleteCategoryQuery, PublicCategoriesQuery, SubcategoryListQuery,
    UpdateCategoryDto,
};
