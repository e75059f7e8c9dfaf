use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::geolocation::models::{BoundingBox, Coordinates};

/// Nominatim `/reverse` response. On a miss Nominatim answers 200 with only `error` set.
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    pub display_name: Option<String>,
    pub address: Option<NominatimAddress>,
    pub boundingbox: Option<Vec<String>>,
    pub error: Option<String>,
}

/// Nominatim address components
#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town or village
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }
}

/// Address found for a coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub display_name: String,
    pub city: Option<String>,
    pub bounding_box: Option<BoundingBox>,
}

impl NominatimResponse {
    fn into_resolved(self) -> Option<ResolvedAddress> {
        let display_name = self.display_name.filter(|d| !d.trim().is_empty())?;
        Some(ResolvedAddress {
            display_name,
            city: self.address.as_ref().and_then(|a| a.get_city()),
            bounding_box: self
                .boundingbox
                .as_deref()
                .and_then(BoundingBox::from_osm),
        })
    }
}

/// Converts coordinates into a human-readable address
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// `Ok(None)` when the provider has no address for this point
    async fn reverse(&self, coords: Coordinates) -> Result<Option<ResolvedAddress>>;
}

/// Reverse geocoder backed by OpenStreetMap Nominatim
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.nominatim_base_url.clone(),
        })
    }

    fn reverse_url(&self, coords: Coordinates) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&addressdetails=1",
            self.base_url, coords.lat, coords.lng
        )
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<Option<ResolvedAddress>> {
        let url = self.reverse_url(coords);
        tracing::debug!("Reverse geocoding ({}, {}) -> {}", coords.lat, coords.lng, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        if let Some(error) = &body.error {
            tracing::debug!("Nominatim has no address for point: {}", error);
        }

        Ok(body.into_resolved())
    }
}
