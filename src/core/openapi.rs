use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::drafts::{dtos as drafts_dtos, handlers as drafts_handlers};
use crate::features::drafts::models as drafts_models;
use crate::features::geolocation::{
    dtos as geolocation_dtos, handlers as geolocation_handlers, models as geolocation_models,
};
use crate::features::navigation::{
    handlers as navigation_handlers, models as navigation_models,
    services as navigation_services,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::core::config::MapSettings;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Drafts
        drafts_handlers::create_draft,
        drafts_handlers::get_draft,
        drafts_handlers::discard_draft,
        drafts_handlers::update_details,
        drafts_handlers::set_address,
        drafts_handlers::device_location,
        drafts_handlers::select_on_map,
        drafts_handlers::upload_media,
        drafts_handlers::remove_media,
        drafts_handlers::get_preview,
        drafts_handlers::next_step,
        drafts_handlers::previous_step,
        drafts_handlers::submit_draft,
        // Geocoding
        geolocation_handlers::reverse_geocode,
        geolocation_handlers::search_places,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::list_my_reports,
        reports_handlers::list_assigned_reports,
        reports_handlers::get_report,
        reports_handlers::update_report,
        reports_handlers::assign_report,
        reports_handlers::update_report_status,
        reports_handlers::delete_report,
        // Navigation
        navigation_handlers::get_menu,
        navigation_handlers::check_route_access,
    ),
    components(
        schemas(
            // Shared
            MapSettings,
            // Geocoding
            geolocation_models::Coordinates,
            geolocation_models::LocationSource,
            geolocation_models::BoundingBox,
            geolocation_dtos::ReverseGeocodeResponseDto,
            geolocation_dtos::PlaceSuggestionDto,
            ApiResponse<geolocation_dtos::ReverseGeocodeResponseDto>,
            ApiResponse<Vec<geolocation_dtos::PlaceSuggestionDto>>,
            // Drafts
            drafts_models::WizardStep,
            drafts_models::MediaKind,
            drafts_models::PreviewHandle,
            drafts_models::ReportCategory,
            drafts_models::ReportSeverity,
            drafts_models::ReportPriority,
            drafts_dtos::UpdateDetailsDto,
            drafts_dtos::SetAddressDto,
            drafts_dtos::DeviceLocationError,
            drafts_dtos::DeviceLocationDto,
            drafts_dtos::UploadMediaDto,
            drafts_dtos::DraftDetailsDto,
            drafts_dtos::DraftLocationDto,
            drafts_dtos::MediaItemDto,
            drafts_dtos::MediaLimitsDto,
            drafts_dtos::DraftResponseDto,
            drafts_dtos::DiscardDraftResponseDto,
            drafts_dtos::RedirectDto,
            drafts_dtos::SubmitResponseDto,
            ApiResponse<drafts_dtos::DraftResponseDto>,
            ApiResponse<drafts_dtos::DiscardDraftResponseDto>,
            ApiResponse<drafts_dtos::SubmitResponseDto>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::UpdateReportDto,
            reports_dtos::AssignReportDto,
            reports_dtos::UpdateReportStatusDto,
            // Navigation
            navigation_models::Role,
            navigation_models::Capability,
            navigation_models::MenuItem,
            navigation_models::DashboardPanel,
            navigation_models::MenuDescriptor,
            navigation_services::AccessDecision,
            ApiResponse<navigation_models::MenuDescriptor>,
            ApiResponse<navigation_services::AccessDecision>,
        )
    ),
    tags(
        (name = "drafts", description = "Report wizard drafts: details, location, media, review and submit"),
        (name = "geocoding", description = "Reverse geocoding and place search"),
        (name = "reports", description = "Submitted reports, proxied to the municipal backend"),
        (name = "navigation", description = "Role-based menus and route access"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Civic Report Gateway API",
        version = "0.1.0",
        description = "API documentation for the civic report gateway",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_gateway_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/drafts/{id}/submit"));
        assert!(paths.contains_key("/api/geocoding/reverse"));
        assert!(paths.contains_key("/api/reports/{id}/status"));
        assert!(paths.contains_key("/api/navigation/{role}/menu"));
    }

    #[test]
    fn test_info_modifier_overrides() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Gateway".to_string(),
            version: "9.9.9".to_string(),
            description: "test".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Gateway");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
