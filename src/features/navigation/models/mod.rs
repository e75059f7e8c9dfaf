mod menu;
mod role;

pub use menu::{DashboardPanel, MenuDescriptor, MenuItem, DASHBOARD_PANELS, MENU_ITEMS};
pub use role::{Capability, Role};
