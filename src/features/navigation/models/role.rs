use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of user roles known to the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Staff,
    MunicipalityAdmin,
    SystemAdmin,
}

/// What a role may do in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SubmitReports,
    ViewOwnReports,
    ViewAssignedReports,
    UpdateReportStatus,
    AssignReports,
    ManageReports,
    ManageStaff,
    ViewAnalytics,
    ManageMunicipalities,
    ManageSponsors,
    ManageUsers,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Citizen,
        Role::Staff,
        Role::MunicipalityAdmin,
        Role::SystemAdmin,
    ];

    pub fn capabilities(self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Citizen => &[SubmitReports, ViewOwnReports],
            Role::Staff => &[ViewAssignedReports, UpdateReportStatus],
            Role::MunicipalityAdmin => &[
                ManageReports,
                UpdateReportStatus,
                AssignReports,
                ManageStaff,
                ViewAnalytics,
            ],
            Role::SystemAdmin => &[ManageMunicipalities, ManageSponsors, ManageUsers],
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Landing page after sign-in, and where denied navigation ends up
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Citizen => "/dashboard",
            Role::Staff => "/staff/dashboard",
            Role::MunicipalityAdmin => "/municipality/dashboard",
            Role::SystemAdmin => "/admin/dashboard",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Citizen => "citizen",
            Role::Staff => "staff",
            Role::MunicipalityAdmin => "municipality_admin",
            Role::SystemAdmin => "system_admin",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_are_disjoint_where_expected() {
        assert!(Role::Citizen.has(Capability::SubmitReports));
        assert!(!Role::Staff.has(Capability::SubmitReports));
        assert!(Role::MunicipalityAdmin.has(Capability::AssignReports));
        assert!(!Role::MunicipalityAdmin.has(Capability::ManageSponsors));
        assert!(Role::SystemAdmin.has(Capability::ManageSponsors));
    }
}
