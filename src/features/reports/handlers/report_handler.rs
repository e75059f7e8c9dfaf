use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, BearerToken};
use crate::features::reports::dtos::{AssignReportDto, UpdateReportDto, UpdateReportStatusDto};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, PaginationQuery};
use crate::shared::validation::FieldError;

fn invalid_fields(e: validator::ValidationErrors) -> AppError {
    AppError::InvalidFields(FieldError::from_validation_errors(&e))
}

/// List all reports (staff and admins)
#[utoipa::path(
    get,
    path = "/api/reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports from the backend"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Backend unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let reports = service.list_all(&pagination, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(reports), None)))
}

/// List reports created by the caller
#[utoipa::path(
    get,
    path = "/api/reports/mine",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Caller's reports"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_my_reports(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let reports = service.list_mine(&pagination, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(reports), None)))
}

/// List reports assigned to the calling staff member
#[utoipa::path(
    get,
    path = "/api/reports/assigned",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Assigned reports"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_assigned_reports(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let reports = service.list_assigned(&pagination, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(reports), None)))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report found"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let report = service.get(&id, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// Update report fields
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated"),
        (status = 400, description = "No fields to update"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Invalid field values")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<Value>>> {
    dto.validate().map_err(invalid_fields)?;
    let report = service.update(&id, &dto, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report updated".to_string()),
    )))
}

/// Assign a report to a staff member
#[utoipa::path(
    put,
    path = "/api/reports/{id}/assign",
    params(("id" = String, Path, description = "Report ID")),
    request_body = AssignReportDto,
    responses(
        (status = 200, description = "Report assigned"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Staff member missing")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn assign_report(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<AssignReportDto>,
) -> Result<Json<ApiResponse<Value>>> {
    dto.validate().map_err(invalid_fields)?;
    let report = service.assign(&id, &dto, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report assigned".to_string()),
    )))
}

/// Update report status
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(("id" = String, Path, description = "Report ID")),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Report not found"),
        (status = 422, description = "Invalid status change")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<Value>>> {
    dto.validate().map_err(invalid_fields)?;
    let report = service.update_status(&id, &dto, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn delete_report(
    token: BearerToken,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&id, token.as_deref()).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted".to_string()),
    )))
}
