use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::shared::validation::validation_error;

/// A WGS84 position in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Validate for Coordinates {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(-90.0..=90.0).contains(&self.lat) {
            errors.add(
                "lat",
                validation_error("range", "Latitude must be between -90 and 90"),
            );
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            errors.add(
                "lng",
                validation_error("range", "Longitude must be between -180 and 180"),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Which trigger last set a draft's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Marker placed by clicking the map
    Map,
    /// Position reported by the device
    Device,
    /// GPS tags embedded in the first photo
    Photo,
}

impl LocationSource {
    /// Whether the user placed this position deliberately
    pub fn is_explicit(self) -> bool {
        matches!(self, LocationSource::Map | LocationSource::Device)
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationSource::Map => write!(f, "map"),
            LocationSource::Device => write!(f, "device"),
            LocationSource::Photo => write!(f, "photo"),
        }
    }
}
