/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// DRAFT LIMITS
// =============================================================================

/// Minimum title length (characters)
pub const TITLE_MIN_LENGTH: u64 = 5;

/// Maximum title length (characters)
pub const TITLE_MAX_LENGTH: u64 = 200;

/// Minimum description length (characters), shown live next to the field
pub const DESCRIPTION_MIN_LENGTH: u64 = 10;

/// Maximum number of photos per draft
pub const MAX_PHOTOS: usize = 5;

/// Maximum number of videos per draft
pub const MAX_VIDEOS: usize = 2;

/// Maximum photo size in bytes (10MB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Maximum video size in bytes (50MB)
pub const MAX_VIDEO_SIZE: usize = 50 * 1024 * 1024;

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

/// Shown when the device could not provide a position
pub const DEVICE_LOCATION_FAILED_MESSAGE: &str =
    "Could not get your current location. Please select the location on the map or enter the address manually.";

/// Shown on the review step when an emergency report carries no media
pub const EMERGENCY_WITHOUT_MEDIA_WARNING: &str =
    "Emergency reports are much more useful with a photo or video";

/// Fallback when the backend gives no usable error detail
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit report. Please try again.";
