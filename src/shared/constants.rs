/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// FIELD LIMITS
// =============================================================================

pub const PASSWORD_MIN: u64 = 8;
pub const PHONE_MIN_DIGITS: usize = 10;

// =============================================================================
// STORAGE
// =============================================================================

/// Folder holding every user's profile pictures (`profile_pictures/{user_id}/...`)
pub const PROFILE_PICTURES_FOLDER: &str = "profile_pictures";
