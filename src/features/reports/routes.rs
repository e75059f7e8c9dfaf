use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
///
/// The caller's bearer token is forwarded; the backend decides access
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/api/reports", get(handlers::list_reports))
        .route("/api/reports/mine", get(handlers::list_my_reports))
        .route("/api/reports/assigned", get(handlers::list_assigned_reports))
        .route(
            "/api/reports/{id}",
            get(handlers::get_report)
                .put(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .route("/api/reports/{id}/assign", put(handlers::assign_report))
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .with_state(report_service)
}
