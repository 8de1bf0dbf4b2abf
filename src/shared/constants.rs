/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default page size for category listings
pub const CATEGORY_PAGE_SIZE: i64 = 20;

// =============================================================================
// HOME VIEW
// =============================================================================

/// Default nav page size on the landing page
pub const HOME_PAGE_SIZE: i64 = 9;

/// Maximum nav page size on the landing page
pub const HOME_MAX_PAGE_SIZE: i64 = 50;

// =============================================================================
// CATEGORY HIERARCHY
// =============================================================================

/// Maximum nesting depth of the category tree
pub const MAX_CATEGORY_DEPTH: i64 = 5;
