use validator::ValidationErrors;

use crate::features::geolocation::models::{Coordinates, LocationSource};
use crate::shared::validation::validation_error;

/// Identifies the draft state a reverse-geocode lookup was started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeTicket {
    coordinates_revision: u64,
    address_revision: u64,
}

/// Outcome of offering new coordinates to a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateUpdate {
    /// Coordinates replaced; look up the address with this ticket
    Applied(GeocodeTicket),
    /// Kept the position the user placed explicitly
    Ignored { kept: LocationSource },
}

/// Step 2 fields of a draft.
///
/// Coordinates and address carry revision counters so that a late reverse-geocode
/// answer cannot overwrite a newer marker or an address the user typed meanwhile.
#[derive(Debug, Clone, Default)]
pub struct DraftLocation {
    address: String,
    ward: Option<String>,
    coordinates: Option<Coordinates>,
    source: Option<LocationSource>,
    coordinates_revision: u64,
    address_revision: u64,
}

impl DraftLocation {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn ward(&self) -> Option<&str> {
        self.ward.as_deref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn source(&self) -> Option<LocationSource> {
        self.source
    }

    fn ticket(&self) -> GeocodeTicket {
        GeocodeTicket {
            coordinates_revision: self.coordinates_revision,
            address_revision: self.address_revision,
        }
    }

    /// Offer coordinates from `source`.
    ///
    /// Map and device positions always win. Photo metadata only fills in
    /// coordinates the user has not placed explicitly.
    pub fn set_coordinates(&mut self, coords: Coordinates, source: LocationSource) -> CoordinateUpdate {
        if !source.is_explicit() {
            if let Some(kept) = self.source.filter(|s| s.is_explicit()) {
                return CoordinateUpdate::Ignored { kept };
            }
        }

        self.coordinates = Some(coords);
        self.source = Some(source);
        self.coordinates_revision += 1;
        CoordinateUpdate::Applied(self.ticket())
    }

    /// Address typed by the user
    pub fn set_address(&mut self, address: String, ward: Option<String>) {
        self.address = address;
        self.ward = ward.filter(|w| !w.trim().is_empty());
        self.address_revision += 1;
    }

    /// Apply a reverse-geocoded address if nothing changed since `ticket` was issued.
    ///
    /// Returns whether the address was written.
    pub fn apply_geocoded_address(&mut self, ticket: GeocodeTicket, address: String) -> bool {
        if ticket != self.ticket() {
            return false;
        }
        self.address = address;
        true
    }

    /// Gate for leaving the location step
    pub fn validate_complete(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.address.trim().is_empty() {
            errors.add("address", validation_error("required", "Address is required"));
        }
        if self.coordinates.is_none() {
            errors.add(
                "coordinates",
                validation_error(
                    "required",
                    "Select the location on the map or use your current location",
                ),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
