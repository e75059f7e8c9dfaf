pub mod draft_handler;

pub use draft_handler::*;
