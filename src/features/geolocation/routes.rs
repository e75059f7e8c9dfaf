use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::geolocation::handlers::{self, GeocodingState};
use crate::features::geolocation::services::{PlaceSearchService, ReverseGeocoder};

/// Create routes for the geocoding feature (public)
pub fn routes(geocoder: Arc<dyn ReverseGeocoder>, place_search: Arc<PlaceSearchService>) -> Router {
    let state = GeocodingState {
        geocoder,
        place_search,
    };

    Router::new()
        .route("/api/geocoding/reverse", get(handlers::reverse_geocode))
        .route("/api/geocoding/search", get(handlers::search_places))
        .with_state(state)
}
