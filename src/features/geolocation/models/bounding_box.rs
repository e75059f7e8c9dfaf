use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Coordinates;

/// Axis-aligned geographic rectangle, used to frame a municipality on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every point. `None` for an empty slice.
    pub fn from_points(points: &[Coordinates]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Self {
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
            min_lng: b.min_lng.min(p.lng),
            max_lng: b.max_lng.max(p.lng),
        }))
    }

    /// Parse the `boundingbox` array returned by Nominatim and LocationIQ:
    /// `[min_lat, max_lat, min_lng, max_lng]` as strings.
    pub fn from_osm(values: &[String]) -> Option<Self> {
        let parsed: Vec<f64> = values
            .iter()
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .collect();
        match parsed.as_slice() {
            [a, b, c, d] => Some(Self {
                min_lat: a.min(*b),
                max_lat: a.max(*b),
                min_lng: c.min(*d),
                max_lng: c.max(*d),
            }),
            _ => None,
        }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}
