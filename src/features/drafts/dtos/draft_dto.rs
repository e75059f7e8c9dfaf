use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::config::MapSettings;
use crate::features::drafts::models::{
    MediaFile, MediaKind, ReportCategory, ReportPriority, ReportSeverity, WizardSession,
    WizardStep,
};
use crate::features::geolocation::models::{Coordinates, LocationSource};
use crate::shared::constants::{
    DESCRIPTION_MIN_LENGTH, MAX_PHOTOS, MAX_PHOTO_SIZE, MAX_VIDEOS, MAX_VIDEO_SIZE,
    TITLE_MAX_LENGTH, TITLE_MIN_LENGTH,
};

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Partial update of the details step; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDetailsDto {
    #[validate(length(max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ReportCategory>,
    pub severity: Option<ReportSeverity>,
    pub priority: Option<ReportPriority>,
    #[validate(length(min = 1, max = 100))]
    pub municipality_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Address typed by the user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetAddressDto {
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: String,
    #[validate(length(max = 100, message = "Ward is too long"))]
    pub ward: Option<String>,
}

/// Why the device could not provide a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeviceLocationError {
    PermissionDenied,
    Timeout,
    Unavailable,
}

/// Outcome of a device geolocation query: either a fix or the failure kind
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeviceLocationDto {
    pub coordinates: Option<Coordinates>,
    pub error: Option<DeviceLocationError>,
}

/// Documentation-only schema for media uploads.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// One part per file; repeat the field for several files
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DraftDetailsDto {
    pub title: String,
    pub description: String,
    /// Live character count of the description
    pub description_length: usize,
    pub description_min: u64,
    pub title_min: u64,
    pub title_max: u64,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub priority: ReportPriority,
    pub municipality_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DraftLocationDto {
    pub address: String,
    pub ward: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub source: Option<LocationSource>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaItemDto {
    pub index: usize,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    pub preview_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaLimitsDto {
    pub max_photos: usize,
    pub max_videos: usize,
    pub max_photo_size: usize,
    pub max_video_size: usize,
}

impl Default for MediaLimitsDto {
    fn default() -> Self {
        Self {
            max_photos: MAX_PHOTOS,
            max_videos: MAX_VIDEOS,
            max_photo_size: MAX_PHOTO_SIZE,
            max_video_size: MAX_VIDEO_SIZE,
        }
    }
}

/// Full state of a draft session
#[derive(Debug, Serialize, ToSchema)]
pub struct DraftResponseDto {
    pub id: Uuid,
    pub step: WizardStep,
    /// 1..=4
    pub step_number: u8,
    pub details: DraftDetailsDto,
    pub location: DraftLocationDto,
    pub photos: Vec<MediaItemDto>,
    pub videos: Vec<MediaItemDto>,
    pub limits: MediaLimitsDto,
    /// Present once the location step has been shown
    pub map: Option<MapSettings>,
    pub warnings: Vec<String>,
    pub submitting: bool,
    pub created_at: DateTime<Utc>,
    /// Text fields of the submission as the backend will read them (review step only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub payload_preview: Option<Value>,
}

impl DraftResponseDto {
    pub fn from_session(session: &WizardSession, payload_preview: Option<Value>) -> Self {
        let draft = &session.draft;
        let details = &draft.details;
        let location = &draft.location;
        let media_items = |kind: MediaKind| -> Vec<MediaItemDto> {
            draft
                .media
                .files(kind)
                .iter()
                .enumerate()
                .map(|(index, file)| MediaItemDto::new(session.id, index, file))
                .collect()
        };

        Self {
            id: session.id,
            step: session.step(),
            step_number: session.step().number(),
            details: DraftDetailsDto {
                title: details.title.clone(),
                description: details.description.clone(),
                description_length: details.description_length(),
                description_min: DESCRIPTION_MIN_LENGTH,
                title_min: TITLE_MIN_LENGTH,
                title_max: TITLE_MAX_LENGTH,
                category: details.category,
                severity: details.severity,
                priority: details.priority,
                municipality_id: details.municipality_id.clone(),
                due_date: details.due_date,
            },
            location: DraftLocationDto {
                address: location.address().to_string(),
                ward: location.ward().map(str::to_string),
                coordinates: location.coordinates(),
                source: location.source(),
            },
            photos: media_items(MediaKind::Photo),
            videos: media_items(MediaKind::Video),
            limits: MediaLimitsDto::default(),
            map: session.map().settings().cloned(),
            warnings: draft.warnings(),
            submitting: session.is_submitting(),
            created_at: session.created_at(),
            payload_preview,
        }
    }
}

impl MediaItemDto {
    fn new(draft_id: Uuid, index: usize, file: &MediaFile) -> Self {
        Self {
            index,
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            size: file.data.len(),
            preview_url: format!("/api/drafts/{}/previews/{}", draft_id, file.preview),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscardDraftResponseDto {
    pub discarded: bool,
    pub released_previews: usize,
}

/// Where and when the client should navigate after submitting
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RedirectDto {
    pub path: String,
    pub delay_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponseDto {
    /// The created report as returned by the backend
    #[schema(value_type = Object)]
    pub report: Value,
    pub redirect: RedirectDto,
    /// The session's fresh draft
    pub draft: DraftResponseDto,
}
