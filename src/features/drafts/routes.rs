use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::drafts::handlers;
use crate::features::drafts::services::WizardService;

/// Create routes for the report wizard (draft sessions)
pub fn routes(wizard_service: Arc<WizardService>) -> Router {
    Router::new()
        .route("/api/drafts", post(handlers::create_draft))
        .route(
            "/api/drafts/{id}",
            get(handlers::get_draft).delete(handlers::discard_draft),
        )
        .route("/api/drafts/{id}/details", put(handlers::update_details))
        .route(
            "/api/drafts/{id}/location/address",
            put(handlers::set_address),
        )
        .route(
            "/api/drafts/{id}/location/device",
            post(handlers::device_location),
        )
        .route("/api/drafts/{id}/location/map", post(handlers::select_on_map))
        .route("/api/drafts/{id}/media/{kind}", post(handlers::upload_media))
        .route(
            "/api/drafts/{id}/media/{kind}/{index}",
            delete(handlers::remove_media),
        )
        .route(
            "/api/drafts/{id}/previews/{handle}",
            get(handlers::get_preview),
        )
        .route("/api/drafts/{id}/next", post(handlers::next_step))
        .route("/api/drafts/{id}/back", post(handlers::previous_step))
        .route("/api/drafts/{id}/submit", post(handlers::submit_draft))
        .with_state(wizard_service)
}
