use axum::{
    extract::{Path, Query},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::navigation::dtos::AccessQuery;
use crate::features::navigation::models::{MenuDescriptor, Role};
use crate::features::navigation::services::{check_access, AccessDecision};
use crate::shared::types::ApiResponse;
use crate::shared::validation::FieldError;

/// Sidebar entries, dashboard panels and home path for a role
#[utoipa::path(
    get,
    path = "/api/navigation/{role}/menu",
    params(("role" = Role, Path, description = "User role")),
    responses(
        (status = 200, description = "Menu for the role", body = ApiResponse<MenuDescriptor>),
        (status = 400, description = "Unknown role")
    ),
    tag = "navigation"
)]
pub async fn get_menu(Path(role): Path<Role>) -> Json<ApiResponse<MenuDescriptor>> {
    Json(ApiResponse::success(Some(MenuDescriptor::for_role(role)), None))
}

/// Decide whether a role may open a front-end path
#[utoipa::path(
    get,
    path = "/api/navigation/{role}/access",
    params(("role" = Role, Path, description = "User role"), AccessQuery),
    responses(
        (status = 200, description = "Access decision", body = ApiResponse<AccessDecision>),
        (status = 422, description = "Missing path")
    ),
    tag = "navigation"
)]
pub async fn check_route_access(
    Path(role): Path<Role>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<ApiResponse<AccessDecision>>> {
    query
        .validate()
        .map_err(|e| AppError::InvalidFields(FieldError::from_validation_errors(&e)))?;

    let decision = check_access(role, &query.path);
    if !decision.allowed {
        tracing::debug!(%role, path = %decision.path, "Navigation denied");
    }
    Ok(Json(ApiResponse::success(Some(decision), None)))
}
