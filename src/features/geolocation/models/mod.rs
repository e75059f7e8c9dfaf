mod bounding_box;
mod coordinates;

pub use bounding_box::BoundingBox;
pub use coordinates::{Coordinates, LocationSource};
