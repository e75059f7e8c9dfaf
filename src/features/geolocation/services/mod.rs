mod geocoding_service;
mod photo_gps;
mod place_search_service;

pub use geocoding_service::{NominatimGeocoder, ResolvedAddress, ReverseGeocoder};
pub use photo_gps::{dms_to_decimal, read_gps_coordinates};
pub use place_search_service::{PlaceSearchService, PlaceSuggestion, DEFAULT_SEARCH_LIMIT};
