use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::geolocation::models::{BoundingBox, Coordinates};
use crate::features::geolocation::services::{PlaceSuggestion, ResolvedAddress};

/// Query for reverse geocoding
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Query for place search
#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaceSearchQuery {
    /// Free-text place name
    pub q: String,
    /// Maximum number of suggestions (default: 5, max: 20)
    pub limit: Option<u8>,
}

/// Response DTO for reverse geocoding
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReverseGeocodeResponseDto {
    pub display_name: String,
    pub city: Option<String>,
    pub bounding_box: Option<BoundingBox>,
}

impl From<ResolvedAddress> for ReverseGeocodeResponseDto {
    fn from(r: ResolvedAddress) -> Self {
        Self {
            display_name: r.display_name,
            city: r.city,
            bounding_box: r.bounding_box,
        }
    }
}

/// Response DTO for a place suggestion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceSuggestionDto {
    pub display_name: String,
    pub coordinates: Coordinates,
    pub bounding_box: Option<BoundingBox>,
    /// Centre of the bounding box, or the point itself when no box is known
    pub center: Coordinates,
}

impl From<PlaceSuggestion> for PlaceSuggestionDto {
    fn from(p: PlaceSuggestion) -> Self {
        let center = p
            .bounding_box
            .map(|b| b.center())
            .unwrap_or(p.coordinates);
        Self {
            display_name: p.display_name,
            coordinates: p.coordinates,
            bounding_box: p.bounding_box,
            center,
        }
    }
}
