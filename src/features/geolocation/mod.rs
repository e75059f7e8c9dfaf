pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{NominatimGeocoder, PlaceSearchService, ReverseGeocoder};
