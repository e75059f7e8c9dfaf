use axum::{routing::get, Router};

use crate::features::navigation::handlers;

/// Role-based navigation lookups; stateless
pub fn routes() -> Router {
    Router::new()
        .route("/api/navigation/{role}/menu", get(handlers::get_menu))
        .route(
            "/api/navigation/{role}/access",
            get(handlers::check_route_access),
        )
}
