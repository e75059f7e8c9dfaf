mod client;
mod endpoints;
mod error_detail;

pub use client::BackendClient;
pub use endpoints::BackendEndpoint;
pub use error_detail::{flatten_error_detail, user_message};
