use serde::Serialize;
use utoipa::ToSchema;

use super::{Capability, Role};

/// One sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    /// `None` for entries every role sees
    pub requires: Option<Capability>,
}

/// One stat panel on a role's dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardPanel {
    pub key: &'static str,
    pub title: &'static str,
    pub requires: Capability,
}

/// Everything the front end needs to lay out navigation for a role
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuDescriptor {
    pub role: Role,
    pub home_path: &'static str,
    pub items: Vec<MenuItem>,
    pub dashboard_panels: Vec<DashboardPanel>,
}

const fn item(
    label: &'static str,
    path: &'static str,
    icon: &'static str,
    requires: Option<Capability>,
) -> MenuItem {
    MenuItem {
        label,
        path,
        icon,
        requires,
    }
}

/// Sidebar entries in display order; each role sees those its capabilities allow
pub const MENU_ITEMS: &[MenuItem] = &[
    item("Dashboard", "/dashboard", "home", Some(Capability::ViewOwnReports)),
    item("Report an issue", "/reports/new", "plus", Some(Capability::SubmitReports)),
    item("My reports", "/reports", "list", Some(Capability::ViewOwnReports)),
    item("Dashboard", "/staff/dashboard", "home", Some(Capability::ViewAssignedReports)),
    item("Assigned reports", "/staff/reports", "clipboard", Some(Capability::ViewAssignedReports)),
    item("Dashboard", "/municipality/dashboard", "home", Some(Capability::ManageReports)),
    item("All reports", "/municipality/reports", "list", Some(Capability::ManageReports)),
    item("Staff", "/municipality/staff", "users", Some(Capability::ManageStaff)),
    item("Analytics", "/municipality/analytics", "chart", Some(Capability::ViewAnalytics)),
    item("Dashboard", "/admin/dashboard", "home", Some(Capability::ManageMunicipalities)),
    item("Municipalities", "/admin/municipalities", "building", Some(Capability::ManageMunicipalities)),
    item("Sponsors", "/admin/sponsors", "megaphone", Some(Capability::ManageSponsors)),
    item("Users", "/admin/users", "users", Some(Capability::ManageUsers)),
    item("Profile", "/profile", "user", None),
];

pub const DASHBOARD_PANELS: &[DashboardPanel] = &[
    DashboardPanel {
        key: "my_reports",
        title: "My reports",
        requires: Capability::ViewOwnReports,
    },
    DashboardPanel {
        key: "assigned_open",
        title: "Open assignments",
        requires: Capability::ViewAssignedReports,
    },
    DashboardPanel {
        key: "reports_by_status",
        title: "Reports by status",
        requires: Capability::ManageReports,
    },
    DashboardPanel {
        key: "staff_workload",
        title: "Staff workload",
        requires: Capability::ManageStaff,
    },
    DashboardPanel {
        key: "resolution_time",
        title: "Average resolution time",
        requires: Capability::ViewAnalytics,
    },
    DashboardPanel {
        key: "municipalities",
        title: "Municipalities",
        requires: Capability::ManageMunicipalities,
    },
    DashboardPanel {
        key: "active_campaigns",
        title: "Active sponsor campaigns",
        requires: Capability::ManageSponsors,
    },
];

impl MenuDescriptor {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            home_path: role.home_path(),
            items: MENU_ITEMS
                .iter()
                .filter(|item| item.requires.map_or(true, |c| role.has(c)))
                .cloned()
                .collect(),
            dashboard_panels: DASHBOARD_PANELS
                .iter()
                .filter(|panel| role.has(panel.requires))
                .cloned()
                .collect(),
        }
    }
}
