use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Front-end path the user is about to open
    #[validate(length(min = 1, max = 2048, message = "Path is required"))]
    pub path: String,
}
