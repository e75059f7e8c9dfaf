mod route_guard;

pub use route_guard::{check_access, required_capability, AccessDecision, ROUTE_GUARDS};
