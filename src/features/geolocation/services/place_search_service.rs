use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::geolocation::models::{BoundingBox, Coordinates};

/// Default number of suggestions returned by place search
pub const DEFAULT_SEARCH_LIMIT: u8 = 5;

/// Maximum number of suggestions LocationIQ will return
pub const MAX_SEARCH_LIMIT: u8 = 20;

/// LocationIQ autocomplete item
#[derive(Debug, Deserialize)]
struct LocationIqPlace {
    display_name: String,
    lat: String,
    lon: String,
    boundingbox: Option<Vec<String>>,
}

/// A place matching a free-text query
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub coordinates: Coordinates,
    pub bounding_box: Option<BoundingBox>,
}

/// Free-text place search used when registering a municipality
pub struct PlaceSearchService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PlaceSearchService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.locationiq_base_url.clone(),
            api_key: config.locationiq_api_key.clone(),
        })
    }

    /// Search places by name. Suggestions with unparsable coordinates are dropped.
    pub async fn search(&self, query: &str, limit: u8) -> Result<Vec<PlaceSuggestion>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::ExternalServiceError("Place search is not configured".to_string())
        })?;

        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

        let url = format!(
            "{}/v1/autocomplete?key={}&q={}&limit={}&format=json",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(query),
            limit
        );
        tracing::debug!("Place search: {} (limit {})", query, limit);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("LocationIQ request failed: {:?}", e);
            AppError::ExternalServiceError(format!("LocationIQ request failed: {}", e))
        })?;

        // LocationIQ answers 404 when nothing matches
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            tracing::warn!("LocationIQ returned status: {}", response.status());
            return Err(AppError::ExternalServiceError(format!(
                "LocationIQ returned status {}",
                response.status()
            )));
        }

        let places: Vec<LocationIqPlace> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse LocationIQ response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse LocationIQ response: {}", e))
        })?;

        Ok(places.into_iter().filter_map(Self::to_suggestion).collect())
    }

    fn to_suggestion(place: LocationIqPlace) -> Option<PlaceSuggestion> {
        let lat = place.lat.parse::<f64>().ok()?;
        let lng = place.lon.parse::<f64>().ok()?;
        Some(PlaceSuggestion {
            display_name: place.display_name,
            coordinates: Coordinates::new(lat, lng),
            bounding_box: place.boundingbox.as_deref().and_then(BoundingBox::from_osm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::spawn_mock_server;
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(base_url: String, api_key: Option<&str>) -> GeocodingConfig {
        GeocodingConfig {
            nominatim_base_url: String::new(),
            user_agent: "test-agent".to_string(),
            timeout: Duration::from_secs(5),
            locationiq_base_url: base_url,
            locationiq_api_key: api_key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_search_without_key_is_not_configured() {
        let service = PlaceSearchService::new(&config(String::new(), None)).unwrap();
        let result = service.search("Kathmandu", 5).await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[tokio::test]
    async fn test_search_parses_suggestions() {
        let app = Router::new().route(
            "/v1/autocomplete",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("key").map(String::as_str), Some("test-key"));
                assert_eq!(q.get("q").map(String::as_str), Some("Lalitpur Metro"));
                Json(serde_json::json!([
                    {
                        "display_name": "Lalitpur Metropolitan City, Nepal",
                        "lat": "27.6588",
                        "lon": "85.3247",
                        "boundingbox": ["27.62", "27.69", "85.29", "85.36"]
                    },
                    { "display_name": "Broken", "lat": "n/a", "lon": "85.0" }
                ]))
            }),
        );
        let base = spawn_mock_server(app).await;
        let service = PlaceSearchService::new(&config(base, Some("test-key"))).unwrap();

        let results = service.search("Lalitpur Metro", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "Lalitpur Metropolitan City, Nepal");
        assert!(results[0]
            .bounding_box
            .unwrap()
            .contains(&results[0].coordinates));
    }
}
