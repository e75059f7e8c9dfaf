use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    #[default]
    Road,
    Electricity,
    Water,
    Sanitation,
    Safety,
    Emergency,
    IllegalActivity,
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCategory::Road => write!(f, "road"),
            ReportCategory::Electricity => write!(f, "electricity"),
            ReportCategory::Water => write!(f, "water"),
            ReportCategory::Sanitation => write!(f, "sanitation"),
            ReportCategory::Safety => write!(f, "safety"),
            ReportCategory::Emergency => write!(f, "emergency"),
            ReportCategory::IllegalActivity => write!(f, "illegal_activity"),
        }
    }
}

/// How serious the issue is for the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

impl std::fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSeverity::Low => write!(f, "low"),
            ReportSeverity::Medium => write!(f, "medium"),
            ReportSeverity::High => write!(f, "high"),
            ReportSeverity::Emergency => write!(f, "emergency"),
        }
    }
}

/// Requested handling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportPriority::Low => write!(f, "low"),
            ReportPriority::Medium => write!(f, "medium"),
            ReportPriority::High => write!(f, "high"),
            ReportPriority::Urgent => write!(f, "urgent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for category in [
            ReportCategory::Road,
            ReportCategory::IllegalActivity,
            ReportCategory::Sanitation,
        ] {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
        assert_eq!(
            serde_json::to_string(&ReportSeverity::Emergency).unwrap(),
            "\"emergency\""
        );
        assert_eq!(ReportPriority::Urgent.to_string(), "urgent");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ReportCategory::default(), ReportCategory::Road);
        assert_eq!(ReportSeverity::default(), ReportSeverity::Medium);
        assert_eq!(ReportPriority::default(), ReportPriority::Medium);
    }
}
