pub mod drafts;
pub mod geolocation;
pub mod navigation;
pub mod reports;
