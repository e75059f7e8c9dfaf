use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, BearerToken};
use crate::features::drafts::dtos::{
    DeviceLocationDto, DiscardDraftResponseDto, DraftResponseDto, SetAddressDto,
    SubmitResponseDto, UpdateDetailsDto, UploadMediaDto,
};
use crate::features::drafts::models::{IncomingFile, MediaKind, PreviewHandle};
use crate::features::drafts::services::WizardService;
use crate::features::geolocation::models::Coordinates;
use crate::shared::types::ApiResponse;
use crate::shared::validation::FieldError;

/// Multipart field carrying the uploaded files
const FILES_FIELD: &str = "files";

fn invalid_fields(e: validator::ValidationErrors) -> AppError {
    AppError::InvalidFields(FieldError::from_validation_errors(&e))
}

/// Start a new report draft
#[utoipa::path(
    post,
    path = "/api/drafts",
    tag = "drafts",
    responses(
        (status = 201, description = "Draft created at the details step", body = ApiResponse<DraftResponseDto>),
        (status = 503, description = "Too many active drafts")
    )
)]
pub async fn create_draft(
    State(service): State<Arc<WizardService>>,
) -> Result<(StatusCode, Json<ApiResponse<DraftResponseDto>>)> {
    let draft = service.create_draft().await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(draft), None)),
    ))
}

/// Get the current state of a draft
#[utoipa::path(
    get,
    path = "/api/drafts/{id}",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Draft state", body = ApiResponse<DraftResponseDto>),
        (status = 404, description = "Draft not found")
    )
)]
pub async fn get_draft(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let draft = service.get_draft(id).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Discard a draft and release its previews
#[utoipa::path(
    delete,
    path = "/api/drafts/{id}",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Draft discarded", body = ApiResponse<DiscardDraftResponseDto>),
        (status = 404, description = "Draft not found"),
        (status = 409, description = "Draft is being submitted")
    )
)]
pub async fn discard_draft(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DiscardDraftResponseDto>>> {
    let result = service.discard_draft(id).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Draft discarded".to_string()),
    )))
}

/// Update title, description, category, severity, priority, municipality or due date
#[utoipa::path(
    put,
    path = "/api/drafts/{id}/details",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = UpdateDetailsDto,
    responses(
        (status = 200, description = "Details updated", body = ApiResponse<DraftResponseDto>),
        (status = 404, description = "Draft not found"),
        (status = 409, description = "Draft is being submitted"),
        (status = 422, description = "Invalid field values")
    )
)]
pub async fn update_details(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateDetailsDto>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    dto.validate().map_err(invalid_fields)?;
    let draft = service.update_details(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Enter the address by hand
#[utoipa::path(
    put,
    path = "/api/drafts/{id}/location/address",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = SetAddressDto,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<DraftResponseDto>),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Invalid field values")
    )
)]
pub async fn set_address(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetAddressDto>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    dto.validate().map_err(invalid_fields)?;
    let draft = service.set_address(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Report the result of a device geolocation query
///
/// A failed query leaves the draft unchanged and returns an instruction
/// to pick the location on the map instead.
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/location/device",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = DeviceLocationDto,
    responses(
        (status = 200, description = "Location applied, or instruction message on failure", body = ApiResponse<DraftResponseDto>),
        (status = 400, description = "Neither or both of coordinates and error given"),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Coordinates out of range")
    )
)]
pub async fn device_location(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<DeviceLocationDto>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let (draft, message) = service.device_location(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(draft), message)))
}

/// Place or move the map marker
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/location/map",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = Coordinates,
    responses(
        (status = 200, description = "Marker placed", body = ApiResponse<DraftResponseDto>),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Coordinates out of range")
    )
)]
pub async fn select_on_map(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
    AppJson(coords): AppJson<Coordinates>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let draft = service.select_on_map(id, coords).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Attach photos or videos
///
/// Accepts multipart/form-data with one or more `files` parts. The whole
/// batch is rejected if any file breaks the type, size or count limits.
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/media/{kind}",
    tag = "drafts",
    params(
        ("id" = Uuid, Path, description = "Draft ID"),
        ("kind" = MediaKind, Path, description = "photos or videos")
    ),
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Repeated `files` parts",
    ),
    responses(
        (status = 200, description = "Files attached", body = ApiResponse<DraftResponseDto>),
        (status = 400, description = "Batch rejected: wrong type, file too large or too many files"),
        (status = 404, description = "Draft not found"),
        (status = 413, description = "Request body over the server limit")
    )
)]
pub async fn upload_media(
    State(service): State<Arc<WizardService>>,
    Path((id, kind)): Path<(Uuid, MediaKind)>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        }
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != FILES_FIELD {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        files.push(IncomingFile {
            file_name,
            content_type,
            data,
        });
    }

    let draft = service.add_media(id, kind, files).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Remove one photo or video; later entries move up by one
#[utoipa::path(
    delete,
    path = "/api/drafts/{id}/media/{kind}/{index}",
    tag = "drafts",
    params(
        ("id" = Uuid, Path, description = "Draft ID"),
        ("kind" = MediaKind, Path, description = "photos or videos"),
        ("index" = usize, Path, description = "Zero-based position")
    ),
    responses(
        (status = 200, description = "File removed", body = ApiResponse<DraftResponseDto>),
        (status = 404, description = "Draft or entry not found")
    )
)]
pub async fn remove_media(
    State(service): State<Arc<WizardService>>,
    Path((id, kind, index)): Path<(Uuid, MediaKind, usize)>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let draft = service.remove_media(id, kind, index).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Serve the preview of an attached file
#[utoipa::path(
    get,
    path = "/api/drafts/{id}/previews/{handle}",
    tag = "drafts",
    params(
        ("id" = Uuid, Path, description = "Draft ID"),
        ("handle" = Uuid, Path, description = "Preview handle")
    ),
    responses(
        (status = 200, description = "File content with its original content type"),
        (status = 404, description = "Draft not found or preview released")
    )
)]
pub async fn get_preview(
    State(service): State<Arc<WizardService>>,
    Path((id, handle)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let (content_type, data) = service
        .preview(id, PreviewHandle::from_uuid(handle))
        .await?;
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

/// Advance to the next step if the current one is complete
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/next",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Moved to the next step", body = ApiResponse<DraftResponseDto>),
        (status = 400, description = "Already at the review step"),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Current step incomplete; inline field errors")
    )
)]
pub async fn next_step(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let draft = service.next(id).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Go back one step
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/back",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Moved to the previous step", body = ApiResponse<DraftResponseDto>),
        (status = 400, description = "Already at the first step"),
        (status = 404, description = "Draft not found")
    )
)]
pub async fn previous_step(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DraftResponseDto>>> {
    let draft = service.back(id).await?;
    Ok(Json(ApiResponse::success(Some(draft), None)))
}

/// Submit the draft to the municipal backend
///
/// The caller's bearer token is forwarded. On success the draft starts over
/// and the response tells the client where to navigate and after how long.
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/submit",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 201, description = "Report created", body = ApiResponse<SubmitResponseDto>),
        (status = 400, description = "Not on the review step"),
        (status = 404, description = "Draft not found"),
        (status = 409, description = "Submission already in progress"),
        (status = 422, description = "Draft incomplete or rejected by the backend"),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn submit_draft(
    State(service): State<Arc<WizardService>>,
    Path(id): Path<Uuid>,
    token: BearerToken,
) -> Result<(StatusCode, Json<ApiResponse<SubmitResponseDto>>)> {
    let result = service.submit(id, token.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(result),
            Some("Report submitted successfully".to_string()),
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{LocationEncoding, MapSettings, WizardConfig};
    use crate::features::drafts::routes;
    use crate::modules::backend::BackendClient;
    use crate::shared::test_helpers::{
        mock_reports_backend, spawn_mock_server, test_backend_config, StaticGeocoder,
    };
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(backend_url: &str) -> TestServer {
        server_configured(backend_url, WizardConfig::default())
    }

    fn server_configured(backend_url: &str, config: WizardConfig) -> TestServer {
        let backend = BackendClient::new(&test_backend_config(backend_url)).unwrap();
        let service = Arc::new(WizardService::new(
            Arc::new(StaticGeocoder::found("Main St, Kathmandu")),
            Arc::new(backend),
            config,
            MapSettings::default(),
            LocationEncoding::Bracketed,
        ));
        TestServer::new(routes::routes(service)).unwrap()
    }

    async fn new_draft(server: &TestServer) -> String {
        let response = server.post("/api/drafts").await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    fn photo_part(name: &str) -> Part {
        Part::bytes(name.as_bytes().to_vec())
            .file_name(name)
            .mime_type("image/jpeg")
    }

    #[tokio::test]
    async fn test_wizard_end_to_end() {
        let backend = spawn_mock_server(mock_reports_backend()).await;
        let server = server(&backend);
        let id = new_draft(&server).await;

        server
            .put(&format!("/api/drafts/{}/details", id))
            .json(&json!({
                "title": "Pothole on Main St",
                "description": "Large pothole causing traffic hazard near the market",
                "category": "road"
            }))
            .await
            .assert_status_ok();

        let response = server.post(&format!("/api/drafts/{}/next", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["step"], "location");
        assert_eq!(body["data"]["map"]["default_zoom"], 13);

        let response = server
            .post(&format!("/api/drafts/{}/location/map", id))
            .json(&json!({ "lat": 27.70, "lng": 85.32 }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["location"]["address"], "Main St, Kathmandu");
        assert_eq!(body["data"]["location"]["source"], "map");

        server
            .post(&format!("/api/drafts/{}/next", id))
            .await
            .assert_status_ok();
        let response = server.post(&format!("/api/drafts/{}/next", id)).await;
        let body: Value = response.json();
        assert_eq!(body["data"]["step_number"], 4);
        assert_eq!(
            body["data"]["payload_preview"]["location"]["address"],
            "Main St, Kathmandu"
        );

        let response = server
            .post(&format!("/api/drafts/{}/submit", id))
            .add_header("authorization", "Bearer citizen-token")
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["redirect"]["path"], "/reports");
        assert_eq!(body["data"]["redirect"]["delay_ms"], 2000);
        assert_eq!(body["data"]["report"]["fields"]["category"], "road");
        assert_eq!(body["data"]["draft"]["step"], "details");
        assert_eq!(body["data"]["draft"]["details"]["title"], "");
    }

    #[tokio::test]
    async fn test_next_blocked_with_inline_error() {
        let server = server("http://127.0.0.1:9");
        let id = new_draft(&server).await;
        server
            .put(&format!("/api/drafts/{}/details", id))
            .json(&json!({ "title": "Pothole on Main St", "description": "Holes" }))
            .await
            .assert_status_ok();

        let response = server.post(&format!("/api/drafts/{}/next", id)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert!(errors[0]
            .as_str()
            .unwrap()
            .starts_with("description: Description is too short (minimum 10 required)"));

        let body: Value = server.get(&format!("/api/drafts/{}", id)).await.json();
        assert_eq!(body["data"]["step_number"], 1);
        assert_eq!(body["data"]["details"]["description_length"], 5);
    }

    #[tokio::test]
    async fn test_upload_preview_and_remove() {
        let server = server("http://127.0.0.1:9");
        let id = new_draft(&server).await;

        let form = MultipartForm::new()
            .add_part("files", photo_part("a.jpg"))
            .add_part("files", photo_part("b.jpg"));
        let response = server
            .post(&format!("/api/drafts/{}/media/photos", id))
            .multipart(form)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let preview_url = body["data"]["photos"][0]["preview_url"]
            .as_str()
            .unwrap()
            .to_string();

        let preview = server.get(&preview_url).await;
        preview.assert_status_ok();
        assert_eq!(&preview.as_bytes()[..], b"a.jpg");
        assert_eq!(preview.header("content-type"), "image/jpeg");

        let response = server
            .delete(&format!("/api/drafts/{}/media/photos/0", id))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["photos"][0]["file_name"], "b.jpg");
        server
            .get(&preview_url)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_wrong_type_rejected() {
        let server = server("http://127.0.0.1:9");
        let id = new_draft(&server).await;

        let form = MultipartForm::new().add_part("files", photo_part("a.jpg"));
        let response = server
            .post(&format!("/api/drafts/{}/media/videos", id))
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = server.get(&format!("/api/drafts/{}", id)).await.json();
        assert_eq!(body["data"]["videos"], json!([]));
    }

    #[tokio::test]
    async fn test_device_failure_message() {
        let server = server("http://127.0.0.1:9");
        let id = new_draft(&server).await;
        let response = server
            .post(&format!("/api/drafts/{}/location/device", id))
            .json(&json!({ "error": "timeout" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("select the location on the map"));
        assert_eq!(body["data"]["location"]["coordinates"], Value::Null);
    }

    #[tokio::test]
    async fn test_discard_and_unknown_draft() {
        let server = server("http://127.0.0.1:9");
        let id = new_draft(&server).await;
        let response = server.delete(&format!("/api/drafts/{}", id)).await;
        response.assert_status_ok();
        server
            .get(&format!("/api/drafts/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_draft_limit_answers_service_unavailable() {
        let server = server_configured(
            "http://127.0.0.1:9",
            WizardConfig {
                max_active_drafts: 1,
                ..Default::default()
            },
        );
        new_draft(&server).await;

        let response = server.post("/api/drafts").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Too many reports"));
    }
}
