/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Moderator role - can work the report queue and review reports
pub const ROLE_MODERATOR: &str = "moderator";

/// Admin role - implies every moderator capability
pub const ROLE_ADMIN: &str = "admin";
