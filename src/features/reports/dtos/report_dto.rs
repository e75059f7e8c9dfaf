use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::drafts::models::{ReportCategory, ReportPriority, ReportSeverity};
use crate::features::reports::models::ReportStatus;

/// Partial update of a submitted report
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReportDto {
    #[validate(length(
        min = 5,
        max = 200,
        message = "Title must be between 5 and 200 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "Description is too short (minimum 10 required)"))]
    pub description: Option<String>,
    pub category: Option<ReportCategory>,
    pub severity: Option<ReportSeverity>,
    pub priority: Option<ReportPriority>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateReportDto {
    /// JSON body in the backend's field naming; absent fields are omitted
    pub fn to_backend_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".to_string(), json!(title.trim()));
        }
        if let Some(description) = &self.description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(category) = self.category {
            body.insert("category".to_string(), json!(category));
        }
        if let Some(severity) = self.severity {
            body.insert("severity".to_string(), json!(severity));
        }
        if let Some(priority) = self.priority {
            body.insert("priority".to_string(), json!(priority));
        }
        if let Some(due_date) = self.due_date {
            body.insert(
                "dueDate".to_string(),
                json!(due_date.format("%Y-%m-%d").to_string()),
            );
        }
        Value::Object(body)
    }

    pub fn is_empty(&self) -> bool {
        self.to_backend_body()
            .as_object()
            .map(Map::is_empty)
            .unwrap_or(true)
    }
}

/// Assign a report to a staff member
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignReportDto {
    #[validate(length(min = 1, message = "Staff member is required"))]
    pub staff_id: String,
}

impl AssignReportDto {
    pub fn to_backend_body(&self) -> Value {
        json!({ "staffId": self.staff_id })
    }
}

/// Move a report to another workflow status
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
    #[validate(length(max = 1000, message = "Note is too long"))]
    pub note: Option<String>,
}

impl UpdateReportStatusDto {
    pub fn to_backend_body(&self) -> Value {
        let mut body = json!({ "status": self.status });
        if let Some(note) = self.note.as_deref().filter(|n| !n.trim().is_empty()) {
            body["note"] = json!(note);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_uses_backend_names() {
        let dto = UpdateReportDto {
            title: Some("  Broken streetlight ".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            severity: Some(ReportSeverity::High),
            ..Default::default()
        };
        assert_eq!(
            dto.to_backend_body(),
            json!({ "title": "Broken streetlight", "dueDate": "2025-01-31", "severity": "high" })
        );
        assert!(UpdateReportDto::default().is_empty());
    }

    #[test]
    fn test_update_validation() {
        let dto = UpdateReportDto {
            title: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_status_body_skips_blank_note() {
        let dto = UpdateReportStatusDto {
            status: ReportStatus::InProgress,
            note: Some("  ".to_string()),
        };
        assert_eq!(dto.to_backend_body(), json!({ "status": "in_progress" }));
    }
}
