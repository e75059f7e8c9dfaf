pub mod constants;
pub mod form;
pub mod test_helpers;
pub mod types;
pub mod validation;
