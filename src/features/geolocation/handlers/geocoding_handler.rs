use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::geolocation::dtos::{
    PlaceSearchQuery, PlaceSuggestionDto, ReverseGeocodeQuery, ReverseGeocodeResponseDto,
};
use crate::features::geolocation::models::Coordinates;
use crate::features::geolocation::services::{
    PlaceSearchService, ReverseGeocoder, DEFAULT_SEARCH_LIMIT,
};
use crate::shared::types::ApiResponse;
use crate::shared::validation::FieldError;

/// State for geocoding handlers
#[derive(Clone)]
pub struct GeocodingState {
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub place_search: Arc<PlaceSearchService>,
}

/// Resolve coordinates to a human-readable address
#[utoipa::path(
    get,
    path = "/api/geocoding/reverse",
    params(ReverseGeocodeQuery),
    responses(
        (status = 200, description = "Address found", body = ApiResponse<ReverseGeocodeResponseDto>),
        (status = 404, description = "No address for these coordinates"),
        (status = 422, description = "Coordinates out of range"),
        (status = 502, description = "Geocoding provider unavailable")
    ),
    tag = "geocoding"
)]
pub async fn reverse_geocode(
    State(state): State<GeocodingState>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<ApiResponse<ReverseGeocodeResponseDto>>> {
    let coords = Coordinates::new(query.lat, query.lng);
    coords
        .validate()
        .map_err(|e| AppError::InvalidFields(FieldError::from_validation_errors(&e)))?;

    let resolved = state.geocoder.reverse(coords).await?.ok_or_else(|| {
        AppError::NotFound("No address found for the given coordinates".to_string())
    })?;

    Ok(Json(ApiResponse::success(Some(resolved.into()), None)))
}

/// Search places by name (municipality registration autocomplete)
#[utoipa::path(
    get,
    path = "/api/geocoding/search",
    params(PlaceSearchQuery),
    responses(
        (status = 200, description = "Matching places", body = ApiResponse<Vec<PlaceSuggestionDto>>),
        (status = 502, description = "Place search unavailable or not configured")
    ),
    tag = "geocoding"
)]
pub async fn search_places(
    State(state): State<GeocodingState>,
    Query(query): Query<PlaceSearchQuery>,
) -> Result<Json<ApiResponse<Vec<PlaceSuggestionDto>>>> {
    let suggestions = state
        .place_search
        .search(&query.q, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await?;
    let dtos = suggestions.into_iter().map(PlaceSuggestionDto::from).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::geolocation::routes;
    use crate::shared::test_helpers::{test_geocoding_config, StaticGeocoder};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn server(geocoder: StaticGeocoder) -> TestServer {
        let place_search =
            Arc::new(PlaceSearchService::new(&test_geocoding_config()).unwrap());
        TestServer::new(routes::routes(Arc::new(geocoder), place_search)).unwrap()
    }

    #[tokio::test]
    async fn test_reverse_geocode_ok() {
        let server = server(StaticGeocoder::found("Kathmandu Durbar Square"));
        let response = server
            .get("/api/geocoding/reverse")
            .add_query_param("lat", 27.7045)
            .add_query_param("lng", 85.3077)
            .await;
        response.assert_status_ok();
        let body: ApiResponse<ReverseGeocodeResponseDto> = response.json();
        assert_eq!(body.data.unwrap().display_name, "Kathmandu Durbar Square");
    }

    #[tokio::test]
    async fn test_reverse_geocode_out_of_range() {
        let server = server(StaticGeocoder::found("anything"));
        let response = server
            .get("/api/geocoding/reverse")
            .add_query_param("lat", 120.0)
            .add_query_param("lng", 85.0)
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reverse_geocode_miss_is_not_found() {
        let server = server(StaticGeocoder::missing());
        let response = server
            .get("/api/geocoding/reverse")
            .add_query_param("lat", 0.0)
            .add_query_param("lng", 0.0)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_without_api_key_is_bad_gateway() {
        let server = server(StaticGeocoder::missing());
        let response = server
            .get("/api/geocoding/search")
            .add_query_param("q", "Pokhara")
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }
}
