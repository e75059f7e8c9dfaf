use chrono::NaiveDate;
use validator::Validate;

use super::{ReportCategory, ReportPriority, ReportSeverity};

/// Step 1 fields of a draft
#[derive(Debug, Clone, Default, Validate)]
pub struct DraftDetails {
    #[validate(length(
        min = 5,
        max = 200,
        message = "Title must be between 5 and 200 characters"
    ))]
    pub title: String,
    #[validate(length(
        min = 10,
        message = "Description is too short (minimum 10 required)"
    ))]
    pub description: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub priority: ReportPriority,
    /// Municipality the report is addressed to, when the client knows it
    pub municipality_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl DraftDetails {
    /// Character count shown live against the description minimum
    pub fn description_length(&self) -> usize {
        self.description.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(title: &str, description: &str) -> DraftDetails {
        DraftDetails {
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_details() {
        assert!(details(
            "Pothole on Main St",
            "Large pothole causing traffic hazard near the market"
        )
        .validate()
        .is_ok());
    }

    #[test]
    fn test_short_description_rejected() {
        let errors = details("Pothole on Main St", "Hole!").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("description"));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let errors = details("", "Large pothole near the market").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_description_length_counts_chars() {
        assert_eq!(details("x", "नमस्ते").description_length(), 6);
    }
}
