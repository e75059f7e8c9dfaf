use serde::Serialize;
use utoipa::ToSchema;

use crate::features::navigation::models::{Capability, Role};

/// Front-end path prefixes and the capability each one requires.
/// Paths under no prefix are open to every role.
pub const ROUTE_GUARDS: &[(&str, Capability)] = &[
    ("/dashboard", Capability::ViewOwnReports),
    ("/reports", Capability::ViewOwnReports),
    ("/reports/new", Capability::SubmitReports),
    ("/staff", Capability::ViewAssignedReports),
    ("/municipality", Capability::ManageReports),
    ("/municipality/staff", Capability::ManageStaff),
    ("/municipality/analytics", Capability::ViewAnalytics),
    ("/admin", Capability::ManageMunicipalities),
    ("/admin/sponsors", Capability::ManageSponsors),
    ("/admin/users", Capability::ManageUsers),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccessDecision {
    pub path: String,
    pub allowed: bool,
    pub required: Option<Capability>,
    /// Where to send the user when access is denied
    pub redirect_to: Option<&'static str>,
}

/// Drop query string, fragment and trailing slashes
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path[prefix.len()..].starts_with('/'))
}

/// Capability guarding `path`: the one of the longest matching prefix
pub fn required_capability(path: &str) -> Option<Capability> {
    let path = normalize(path);
    ROUTE_GUARDS
        .iter()
        .filter(|(prefix, _)| matches_prefix(path, prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, capability)| *capability)
}

pub fn check_access(role: Role, path: &str) -> AccessDecision {
    let required = required_capability(path);
    let allowed = required.map_or(true, |c| role.has(c));
    AccessDecision {
        path: normalize(path).to_string(),
        allowed,
        required,
        redirect_to: (!allowed).then(|| role.home_path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::navigation::models::MenuDescriptor;

    #[test]
    fn test_longest_prefix_wins() {
        assert_eq!(
            required_capability("/reports/new"),
            Some(Capability::SubmitReports)
        );
        assert_eq!(
            required_capability("/reports/42"),
            Some(Capability::ViewOwnReports)
        );
        assert_eq!(
            required_capability("/admin/sponsors/7/edit"),
            Some(Capability::ManageSponsors)
        );
        assert_eq!(
            required_capability("/admin/municipalities"),
            Some(Capability::ManageMunicipalities)
        );
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        assert_eq!(required_capability("/reportsarchive"), None);
        assert_eq!(required_capability("/profile"), None);
        assert_eq!(
            required_capability("/staff/?tab=open"),
            Some(Capability::ViewAssignedReports)
        );
    }

    #[test]
    fn test_denied_path_redirects_home() {
        let decision = check_access(Role::Citizen, "/admin/users");
        assert!(!decision.allowed);
        assert_eq!(decision.required, Some(Capability::ManageUsers));
        assert_eq!(decision.redirect_to, Some("/dashboard"));

        let decision = check_access(Role::Staff, "/profile");
        assert!(decision.allowed);
        assert_eq!(decision.redirect_to, None);
    }

    #[test]
    fn test_every_menu_entry_is_reachable() {
        for role in Role::ALL {
            let menu = MenuDescriptor::for_role(role);
            assert!(check_access(role, menu.home_path).allowed, "{}", role);
            for item in menu.items {
                assert!(check_access(role, item.path).allowed, "{} {}", role, item.path);
            }
        }
    }
}
