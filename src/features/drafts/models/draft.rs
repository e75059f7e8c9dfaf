use validator::{Validate, ValidationErrors};

use super::{DraftDetails, DraftLocation, MediaIntake, ReportSeverity};
use crate::shared::constants::EMERGENCY_WITHOUT_MEDIA_WARNING;
use crate::shared::validation::FieldError;

/// The in-progress report held by one wizard session
#[derive(Debug, Default)]
pub struct ReportDraft {
    pub details: DraftDetails,
    pub location: DraftLocation,
    pub media: MediaIntake,
}

impl ReportDraft {
    pub fn validate_details(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }

    pub fn validate_location(&self) -> Result<(), ValidationErrors> {
        self.location.validate_complete()
    }

    /// Everything a submission needs, as one list of inline errors
    pub fn validate_for_submit(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        for result in [self.validate_details(), self.validate_location()] {
            if let Err(e) = result {
                errors.extend(FieldError::from_validation_errors(&e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(errors)
        }
    }

    /// Soft warnings; never block navigation or submission
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.details.severity == ReportSeverity::Emergency && self.media.is_empty() {
            warnings.push(EMERGENCY_WITHOUT_MEDIA_WARNING.to_string());
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::drafts::models::{IncomingFile, MediaKind};
    use crate::features::geolocation::models::{Coordinates, LocationSource};
    use axum::body::Bytes;

    fn complete_draft() -> ReportDraft {
        let mut draft = ReportDraft::default();
        draft.details.title = "Pothole on Main St".to_string();
        draft.details.description = "Large pothole causing traffic hazard".to_string();
        draft.location.set_address("Main St".to_string(), None);
        draft
            .location
            .set_coordinates(Coordinates::new(27.70, 85.32), LocationSource::Map);
        draft
    }

    #[test]
    fn test_complete_draft_passes_submit_validation() {
        assert!(complete_draft().validate_for_submit().is_ok());
    }

    #[test]
    fn test_submit_validation_collects_every_field() {
        let mut draft = ReportDraft::default();
        draft.details.title = "ok".to_string();
        let fields: Vec<String> = draft
            .validate_for_submit()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["address", "coordinates", "description", "title"]);
    }

    #[test]
    fn test_emergency_without_media_warns() {
        let mut draft = complete_draft();
        draft.details.severity = ReportSeverity::Emergency;
        assert_eq!(draft.warnings(), vec![EMERGENCY_WITHOUT_MEDIA_WARNING.to_string()]);

        draft
            .media
            .add(
                MediaKind::Video,
                vec![IncomingFile {
                    file_name: "clip.mp4".to_string(),
                    content_type: "video/mp4".to_string(),
                    data: Bytes::from_static(b"v"),
                }],
            )
            .unwrap();
        assert!(draft.warnings().is_empty());
    }
}
