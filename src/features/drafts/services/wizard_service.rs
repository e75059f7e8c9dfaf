use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::{LocationEncoding, MapSettings, WizardConfig};
use crate::core::error::{AppError, Result};
use crate::features::drafts::dtos::{
    DeviceLocationDto, DiscardDraftResponseDto, DraftResponseDto, RedirectDto, SetAddressDto,
    SubmitResponseDto, UpdateDetailsDto,
};
use crate::features::drafts::models::{
    CoordinateUpdate, GeocodeTicket, IncomingFile, MediaKind, PreviewHandle, WizardSession,
    WizardStep,
};
use crate::features::drafts::services::ReportForm;
use crate::features::geolocation::models::{Coordinates, LocationSource};
use crate::features::geolocation::services::{read_gps_coordinates, ReverseGeocoder};
use crate::modules::backend::BackendClient;
use crate::shared::constants::DEVICE_LOCATION_FAILED_MESSAGE;
use crate::shared::validation::FieldError;

type SessionHandle = Arc<Mutex<WizardSession>>;

/// Clears the `submitting` flag if a submission future is dropped before its
/// outcome was applied (client disconnect, request timeout).
struct InFlightSubmission {
    id: Uuid,
    handle: Option<SessionHandle>,
}

impl InFlightSubmission {
    fn new(id: Uuid, handle: SessionHandle) -> Self {
        Self {
            id,
            handle: Some(handle),
        }
    }

    /// The outcome is being applied by the caller
    fn settle(&mut self) {
        self.handle = None;
    }
}

impl Drop for InFlightSubmission {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        warn!("Draft {} submission abandoned, returning to review", self.id);

        let cleared = match handle.try_lock() {
            Ok(mut session) => {
                session.finish_submission(false);
                true
            }
            Err(_) => false,
        };
        if !cleared {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    handle.lock().await.finish_submission(false);
                });
            }
        }
    }
}

/// Owns every draft session and drives the wizard on their behalf.
///
/// A session's draft is only mutated while its mutex is held. Network calls
/// (reverse geocoding, submission) run with the lock released.
pub struct WizardService {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    geocoder: Arc<dyn ReverseGeocoder>,
    backend: Arc<BackendClient>,
    config: WizardConfig,
    map_settings: MapSettings,
    encoding: LocationEncoding,
}

impl WizardService {
    pub fn new(
        geocoder: Arc<dyn ReverseGeocoder>,
        backend: Arc<BackendClient>,
        config: WizardConfig,
        map_settings: MapSettings,
        encoding: LocationEncoding,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            geocoder,
            backend,
            config,
            map_settings,
            encoding,
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, id: Uuid) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Draft {} not found", id)))
    }

    fn view(&self, session: &WizardSession) -> DraftResponseDto {
        let payload_preview = (session.step() == WizardStep::Review)
            .then(|| ReportForm::from_draft(&session.draft, self.encoding).to_nested_json());
        DraftResponseDto::from_session(session, payload_preview)
    }

    /// Lock the session, refuse if it is submitting, apply `f` and return the new state
    async fn edit<F>(&self, id: Uuid, f: F) -> Result<DraftResponseDto>
    where
        F: FnOnce(&mut WizardSession) -> Result<()>,
    {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        session.touch(Instant::now());
        session.ensure_editable()?;
        f(&mut *session)?;
        Ok(self.view(&session))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open a new draft session, refusing once `max_active_drafts` are live
    pub async fn create_draft(&self) -> Result<DraftResponseDto> {
        let id = Uuid::now_v7();
        let session = WizardSession::new(id);
        let view = self.view(&session);

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_active_drafts {
            warn!(
                "Draft limit reached ({} active), refusing new draft",
                sessions.len()
            );
            return Err(AppError::ServiceUnavailable(
                "Too many reports are being drafted right now. Please try again shortly."
                    .to_string(),
            ));
        }
        sessions.insert(id, Arc::new(Mutex::new(session)));
        drop(sessions);

        info!("Draft {} created", id);
        Ok(view)
    }

    pub async fn get_draft(&self, id: Uuid) -> Result<DraftResponseDto> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        session.touch(Instant::now());
        Ok(self.view(&session))
    }

    /// Destroy the draft, releasing each outstanding preview once
    pub async fn discard_draft(&self, id: Uuid) -> Result<DiscardDraftResponseDto> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        if session.is_submitting() {
            return Err(AppError::Conflict(
                "The report is being submitted and cannot be discarded".to_string(),
            ));
        }
        // A sweep may have removed it while we waited for the lock
        if self.sessions.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Draft {} not found", id)));
        }
        let released = session.teardown();
        info!("Draft {} discarded, {} previews released", id, released);

        Ok(DiscardDraftResponseDto {
            discarded: true,
            released_previews: released,
        })
    }

    // =========================================================================
    // Step 1: details
    // =========================================================================

    pub async fn update_details(
        &self,
        id: Uuid,
        dto: UpdateDetailsDto,
    ) -> Result<DraftResponseDto> {
        self.edit(id, |session| {
            let details = &mut session.draft.details;
            if let Some(title) = dto.title {
                details.title = title.trim().to_string();
            }
            if let Some(description) = dto.description {
                details.description = description;
            }
            if let Some(category) = dto.category {
                details.category = category;
            }
            if let Some(severity) = dto.severity {
                details.severity = severity;
            }
            if let Some(priority) = dto.priority {
                details.priority = priority;
            }
            if let Some(municipality_id) = dto.municipality_id {
                details.municipality_id = Some(municipality_id);
            }
            if let Some(due_date) = dto.due_date {
                details.due_date = Some(due_date);
            }
            debug!("Draft {} details updated", session.id);
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Step 2: location
    // =========================================================================

    pub async fn set_address(&self, id: Uuid, dto: SetAddressDto) -> Result<DraftResponseDto> {
        self.edit(id, |session| {
            session.draft.location.set_address(dto.address, dto.ward);
            debug!("Draft {} address edited", session.id);
            Ok(())
        })
        .await
    }

    /// Map click: move the single marker, then look up its address
    pub async fn select_on_map(&self, id: Uuid, coords: Coordinates) -> Result<DraftResponseDto> {
        Self::validate_coordinates(&coords)?;
        self.locate(id, coords, LocationSource::Map).await
    }

    /// Device geolocation result. A failure leaves the draft untouched and
    /// returns the instruction to pick the location manually.
    pub async fn device_location(
        &self,
        id: Uuid,
        dto: DeviceLocationDto,
    ) -> Result<(DraftResponseDto, Option<String>)> {
        match (dto.coordinates, dto.error) {
            (Some(coords), None) => {
                Self::validate_coordinates(&coords)?;
                let view = self.locate(id, coords, LocationSource::Device).await?;
                Ok((view, None))
            }
            (None, Some(kind)) => {
                info!("Draft {} device location unavailable: {:?}", id, kind);
                let view = self.get_draft(id).await?;
                Ok((view, Some(DEVICE_LOCATION_FAILED_MESSAGE.to_string())))
            }
            _ => Err(AppError::BadRequest(
                "Provide either coordinates or an error, not both".to_string(),
            )),
        }
    }

    fn validate_coordinates(coords: &Coordinates) -> Result<()> {
        use validator::Validate;
        coords
            .validate()
            .map_err(|e| AppError::InvalidFields(FieldError::from_validation_errors(&e)))
    }

    async fn locate(
        &self,
        id: Uuid,
        coords: Coordinates,
        source: LocationSource,
    ) -> Result<DraftResponseDto> {
        let handle = self.session(id).await?;
        let update = {
            let mut session = handle.lock().await;
            session.touch(Instant::now());
            session.ensure_editable()?;
            session.draft.location.set_coordinates(coords, source)
        };

        match update {
            CoordinateUpdate::Applied(ticket) => {
                debug!("Draft {} coordinates set from {}", id, source);
                self.resolve_address(&handle, coords, ticket).await;
            }
            CoordinateUpdate::Ignored { kept } => {
                debug!(
                    "Draft {} kept {} coordinates over {} coordinates",
                    id, kept, source
                );
            }
        }

        let session = handle.lock().await;
        Ok(self.view(&session))
    }

    /// Best-effort address lookup. Failures leave the address as it was and the
    /// result is dropped if the location changed while the lookup ran.
    async fn resolve_address(&self, handle: &SessionHandle, coords: Coordinates, ticket: GeocodeTicket) {
        let resolved = match self.geocoder.reverse(coords).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                debug!("No address found for {}, {}", coords.lat, coords.lng);
                return;
            }
            Err(e) => {
                warn!("Reverse geocoding failed for {}, {}: {}", coords.lat, coords.lng, e);
                return;
            }
        };

        let mut session = handle.lock().await;
        if !session
            .draft
            .location
            .apply_geocoded_address(ticket, resolved.display_name)
        {
            debug!("Draft {} ignored a stale geocoding result", session.id);
        }
    }

    // =========================================================================
    // Step 3: media
    // =========================================================================

    pub async fn add_media(
        &self,
        id: Uuid,
        kind: MediaKind,
        files: Vec<IncomingFile>,
    ) -> Result<DraftResponseDto> {
        let handle = self.session(id).await?;
        let photo_ticket = {
            let mut session = handle.lock().await;
            session.touch(Instant::now());
            session.ensure_editable()?;

            let first_photos = kind == MediaKind::Photo && session.draft.media.files(kind).is_empty();
            let gps = if first_photos {
                files.first().and_then(|f| read_gps_coordinates(&f.data))
            } else {
                None
            };

            let count = files.len();
            session.draft.media.add(kind, files)?;
            info!("Draft {} received {} {}", id, count, kind);

            gps.and_then(|coords| {
                match session
                    .draft
                    .location
                    .set_coordinates(coords, LocationSource::Photo)
                {
                    CoordinateUpdate::Applied(ticket) => {
                        debug!("Draft {} coordinates set from photo metadata", id);
                        Some((coords, ticket))
                    }
                    CoordinateUpdate::Ignored { .. } => None,
                }
            })
        };

        if let Some((coords, ticket)) = photo_ticket {
            self.resolve_address(&handle, coords, ticket).await;
        }

        let session = handle.lock().await;
        Ok(self.view(&session))
    }

    pub async fn remove_media(
        &self,
        id: Uuid,
        kind: MediaKind,
        index: usize,
    ) -> Result<DraftResponseDto> {
        self.edit(id, |session| {
            let removed = session.draft.media.remove(kind, index)?;
            let previews = session.draft.media.previews();
            debug!(
                "Draft {} removed {} '{}' ({} previews live, {} released)",
                session.id,
                kind,
                removed.file_name,
                previews.live_count(),
                previews.released_count()
            );
            Ok(())
        })
        .await
    }

    /// Content type and bytes of a live preview
    pub async fn preview(&self, id: Uuid, handle: PreviewHandle) -> Result<(String, Bytes)> {
        let session_handle = self.session(id).await?;
        let session = session_handle.lock().await;
        session
            .draft
            .media
            .previews()
            .get(handle)
            .map(|(content_type, data)| (content_type.to_string(), data))
            .ok_or_else(|| AppError::NotFound(format!("Preview {} not found", handle)))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn next(&self, id: Uuid) -> Result<DraftResponseDto> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        session.touch(Instant::now());
        match session.advance(&self.map_settings) {
            Ok(step) => debug!("Draft {} advanced to {}", id, step),
            Err(e) => {
                debug!("Draft {} blocked at {}: {}", id, session.step(), e);
                return Err(e);
            }
        }
        Ok(self.view(&session))
    }

    pub async fn back(&self, id: Uuid) -> Result<DraftResponseDto> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        session.touch(Instant::now());
        let step = session.retreat()?;
        debug!("Draft {} went back to {}", id, step);
        Ok(self.view(&session))
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Send the draft to the backend as one multipart request.
    ///
    /// On success the session starts over with an empty draft. On failure it
    /// stays on the review step with the draft intact.
    pub async fn submit(&self, id: Uuid, bearer: Option<&str>) -> Result<SubmitResponseDto> {
        let handle = self.session(id).await?;
        let form = {
            let mut session = handle.lock().await;
            session.touch(Instant::now());
            session.begin_submission()?;
            let report_form = ReportForm::from_draft(&session.draft, self.encoding);
            debug!(
                "Draft {} payload: {} parts, files {:?}",
                id,
                report_form.parts().len(),
                report_form.file_names()
            );
            match report_form.into_multipart() {
                Ok(form) => form,
                Err(e) => {
                    session.finish_submission(false);
                    return Err(e);
                }
            }
        };

        let mut in_flight = InFlightSubmission::new(id, handle.clone());
        info!("Submitting draft {}", id);
        let outcome = self.backend.create_report(form, bearer).await;

        let mut session = handle.lock().await;
        in_flight.settle();
        session.touch(Instant::now());
        match outcome {
            Ok(report) => {
                let released = session.finish_submission(true);
                info!(
                    "Draft {} submitted, {} previews released",
                    id, released
                );
                Ok(SubmitResponseDto {
                    report: BackendClient::unwrap_data(report),
                    redirect: RedirectDto {
                        path: self.config.redirect_path.clone(),
                        delay_ms: self.config.redirect_delay_ms,
                    },
                    draft: self.view(&session),
                })
            }
            Err(e) => {
                session.finish_submission(false);
                warn!("Draft {} submission failed: {}", id, e);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Housekeeping
    // =========================================================================

    /// Discard sessions idle for longer than the configured TTL.
    ///
    /// Sessions that are locked or submitting are left alone.
    pub async fn sweep_idle_at(&self, now: Instant) -> usize {
        let ttl = self.config.draft_idle_ttl;
        let mut sessions = self.sessions.write().await;
        let mut swept = 0;

        sessions.retain(|id, handle| {
            let Ok(mut session) = handle.try_lock() else {
                return true;
            };
            if session.is_submitting() || session.idle_for(now) < ttl {
                return true;
            }
            let released = session.teardown();
            debug!("Draft {} expired, {} previews released", id, released);
            swept += 1;
            false
        });

        if swept > 0 {
            info!("Swept {} idle drafts", swept);
        }
        swept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::drafts::models::{ReportCategory, ReportSeverity};
    use crate::shared::test_helpers::{
        failing_reports_backend, gps_tagged_tiff, mock_reports_backend, spawn_mock_server,
        stalled_reports_backend, test_backend_config, GatedGeocoder, StaticGeocoder,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn service_with(geocoder: Arc<dyn ReverseGeocoder>, backend_url: &str) -> WizardService {
        service_configured(geocoder, backend_url, WizardConfig::default())
    }

    fn service_configured(
        geocoder: Arc<dyn ReverseGeocoder>,
        backend_url: &str,
        config: WizardConfig,
    ) -> WizardService {
        let backend = BackendClient::new(&test_backend_config(backend_url)).unwrap();
        WizardService::new(
            geocoder,
            Arc::new(backend),
            config,
            MapSettings::default(),
            LocationEncoding::Bracketed,
        )
    }

    fn service(geocoder: Arc<dyn ReverseGeocoder>) -> WizardService {
        service_with(geocoder, "http://127.0.0.1:9")
    }

    fn details(title: &str, description: &str) -> UpdateDetailsDto {
        UpdateDetailsDto {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            category: Some(ReportCategory::Road),
            ..Default::default()
        }
    }

    fn photo(name: &str) -> IncomingFile {
        IncomingFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: Bytes::from_static(b"not really a jpeg"),
        }
    }

    /// Photo whose EXIF places it at 27°43'1.92"N, `lng_seconds`/100 past 85°19'E
    fn tagged_photo(name: &str, lng_seconds: u32) -> IncomingFile {
        let tiff = gps_tagged_tiff(
            [(27, 1), (43, 1), (192, 100)],
            "N",
            [(85, 1), (19, 1), (lng_seconds, 100)],
            "E",
        );
        IncomingFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: Bytes::from(tiff),
        }
    }

    async fn at_review(service: &WizardService) -> Uuid {
        let id = service.create_draft().await.unwrap().id;
        service
            .update_details(
                id,
                details(
                    "Pothole on Main St",
                    "Large pothole causing traffic hazard near the market",
                ),
            )
            .await
            .unwrap();
        service.next(id).await.unwrap();
        service
            .select_on_map(id, Coordinates::new(27.70, 85.32))
            .await
            .unwrap();
        service.next(id).await.unwrap();
        service.next(id).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_full_wizard_submits_and_resets() {
        let base = spawn_mock_server(mock_reports_backend()).await;
        let service = service_with(Arc::new(StaticGeocoder::found("Main St, Kathmandu")), &base);

        let id = at_review(&service).await;
        let review = service.get_draft(id).await.unwrap();
        assert_eq!(review.step, WizardStep::Review);
        assert_eq!(review.location.address, "Main St, Kathmandu");
        let preview = review.payload_preview.unwrap();
        assert_eq!(preview["location"]["coordinates"]["lat"], "27.7");

        let submitted = service.submit(id, Some("citizen-token")).await.unwrap();
        assert_eq!(submitted.report["id"], "report-1");
        assert_eq!(submitted.report["fields"]["title"], "Pothole on Main St");
        assert_eq!(
            submitted.report["fields"]["location"]["address"],
            "Main St, Kathmandu"
        );
        assert_eq!(submitted.redirect.path, "/reports");
        assert_eq!(submitted.redirect.delay_ms, 2000);
        assert_eq!(submitted.draft.step, WizardStep::Details);
        assert!(submitted.draft.details.title.is_empty());
        assert!(submitted.draft.location.coordinates.is_none());
    }

    #[tokio::test]
    async fn test_short_description_blocks_first_step() {
        let service = service(Arc::new(StaticGeocoder::missing()));
        let id = service.create_draft().await.unwrap().id;
        service
            .update_details(id, details("Pothole on Main St", "Holes"))
            .await
            .unwrap();

        let err = service.next(id).await.unwrap_err();
        match err {
            AppError::InvalidFields(errors) => {
                assert!(errors[0].message.contains("minimum 10 required"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.get_draft(id).await.unwrap().step, WizardStep::Details);
    }

    #[tokio::test]
    async fn test_failed_geocode_keeps_typed_address() {
        let geocoder = Arc::new(StaticGeocoder::failing());
        let service = service(geocoder.clone());
        let id = service.create_draft().await.unwrap().id;
        service
            .set_address(
                id,
                SetAddressDto {
                    address: "Behind the school".to_string(),
                    ward: Some("4".to_string()),
                },
            )
            .await
            .unwrap();

        let (view, message) = service
            .device_location(
                id,
                DeviceLocationDto {
                    coordinates: Some(Coordinates::new(27.7172, 85.3240)),
                    error: None,
                },
            )
            .await
            .unwrap();
        assert!(message.is_none());
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(view.location.address, "Behind the school");
        assert_eq!(view.location.coordinates, Some(Coordinates::new(27.7172, 85.3240)));
    }

    #[tokio::test]
    async fn test_device_fix_fills_address_from_provider() {
        let service = service(Arc::new(StaticGeocoder::found("Kathmandu Durbar Square")));
        let id = service.create_draft().await.unwrap().id;
        let (view, _) = service
            .device_location(
                id,
                DeviceLocationDto {
                    coordinates: Some(Coordinates::new(27.7172, 85.3240)),
                    error: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.location.address, "Kathmandu Durbar Square");
        assert_eq!(view.location.source, Some(LocationSource::Device));
    }

    #[tokio::test]
    async fn test_device_failure_returns_instruction() {
        let geocoder = Arc::new(StaticGeocoder::found("unused"));
        let service = service(geocoder.clone());
        let id = service.create_draft().await.unwrap().id;
        let (view, message) = service
            .device_location(
                id,
                DeviceLocationDto {
                    coordinates: None,
                    error: Some(crate::features::drafts::dtos::DeviceLocationError::PermissionDenied),
                },
            )
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some(DEVICE_LOCATION_FAILED_MESSAGE));
        assert!(view.location.coordinates.is_none());
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_late_geocode_does_not_overwrite_manual_edit() {
        let geocoder = Arc::new(GatedGeocoder::new("Provider address"));
        let started = geocoder.started.clone();
        let release = geocoder.release.clone();
        let service = Arc::new(service(geocoder));
        let id = service.create_draft().await.unwrap().id;

        let clicking = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .select_on_map(id, Coordinates::new(27.70, 85.32))
                    .await
            })
        };

        started.notified().await;
        service
            .set_address(
                id,
                SetAddressDto {
                    address: "Typed by hand".to_string(),
                    ward: None,
                },
            )
            .await
            .unwrap();
        release.notify_one();

        let view = clicking.await.unwrap().unwrap();
        assert_eq!(view.location.address, "Typed by hand");
        assert_eq!(view.location.coordinates, Some(Coordinates::new(27.70, 85.32)));
    }

    #[tokio::test]
    async fn test_emergency_without_media_warns_but_submits() {
        let base = spawn_mock_server(mock_reports_backend()).await;
        let service = service_with(Arc::new(StaticGeocoder::found("Main St")), &base);
        let id = at_review(&service).await;
        service.back(id).await.unwrap();
        let view = service
            .update_details(
                id,
                UpdateDetailsDto {
                    severity: Some(ReportSeverity::Emergency),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.warnings.len(), 1);
        service.next(id).await.unwrap();

        let submitted = service.submit(id, None).await.unwrap();
        assert_eq!(submitted.report["fields"]["severity"], "emergency");
    }

    #[tokio::test]
    async fn test_failed_submission_stays_on_review() {
        let base = spawn_mock_server(failing_reports_backend(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "errors": { "title": ["Title already reported"] } }),
        ))
        .await;
        let service = service_with(Arc::new(StaticGeocoder::found("Main St")), &base);
        let id = at_review(&service).await;

        match service.submit(id, None).await.unwrap_err() {
            AppError::Upstream {
                status, errors, ..
            } => {
                assert_eq!(status, Some(422));
                assert_eq!(errors, vec!["title: Title already reported".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let view = service.get_draft(id).await.unwrap();
        assert_eq!(view.step, WizardStep::Review);
        assert!(!view.submitting);
        assert_eq!(view.details.title, "Pothole on Main St");
    }

    #[tokio::test]
    async fn test_submit_outside_review_rejected() {
        let service = service(Arc::new(StaticGeocoder::missing()));
        let id = service.create_draft().await.unwrap().id;
        assert!(matches!(
            service.submit(id, None).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_media_limits_and_preview_release() {
        let service = service(Arc::new(StaticGeocoder::missing()));
        let id = service.create_draft().await.unwrap().id;
        let view = service
            .add_media(
                id,
                MediaKind::Photo,
                (0..5).map(|i| photo(&format!("{}.jpg", i))).collect(),
            )
            .await
            .unwrap();
        assert_eq!(view.photos.len(), 5);

        let err = service
            .add_media(id, MediaKind::Photo, vec![photo("6.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let second = service.get_draft(id).await.unwrap().photos[1].preview_url.clone();
        let handle: Uuid = second.rsplit('/').next().unwrap().parse().unwrap();
        let handle = PreviewHandle::from_uuid(handle);
        assert!(service.preview(id, handle).await.is_ok());

        let view = service.remove_media(id, MediaKind::Photo, 1).await.unwrap();
        assert_eq!(view.photos.len(), 4);
        assert_eq!(view.photos[1].file_name, "2.jpg");
        assert!(matches!(
            service.preview(id, handle).await,
            Err(AppError::NotFound(_))
        ));

        let discarded = service.discard_draft(id).await.unwrap();
        assert_eq!(discarded.released_previews, 4);
        assert!(matches!(service.get_draft(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sweep_discards_idle_drafts_only() {
        let service = service(Arc::new(StaticGeocoder::missing()));
        let idle = service.create_draft().await.unwrap().id;
        let active = service.create_draft().await.unwrap().id;

        let later = Instant::now() + WizardConfig::default().draft_idle_ttl + Duration::from_secs(1);
        {
            let handle = service.session(active).await.unwrap();
            handle.lock().await.touch(later);
        }

        assert_eq!(service.sweep_idle_at(later).await, 1);
        assert!(service.get_draft(idle).await.is_err());
        assert!(service.get_draft(active).await.is_ok());
        assert_eq!(service.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_first_photo_gps_fills_location() {
        let geocoder = Arc::new(StaticGeocoder::found("Thamel, Kathmandu"));
        let service = service(geocoder.clone());
        let id = service.create_draft().await.unwrap().id;

        let view = service
            .add_media(id, MediaKind::Photo, vec![tagged_photo("a.jpg", 2640), photo("b.jpg")])
            .await
            .unwrap();
        assert_eq!(view.location.source, Some(LocationSource::Photo));
        let coords = view.location.coordinates.unwrap();
        assert!((coords.lat - 27.7172).abs() < 1e-4);
        assert!((coords.lng - 85.3240).abs() < 1e-4);
        assert_eq!(view.location.address, "Thamel, Kathmandu");
        assert_eq!(geocoder.calls(), 1);

        // Later batches never move the location again
        let view = service
            .add_media(id, MediaKind::Photo, vec![tagged_photo("c.jpg", 0)])
            .await
            .unwrap();
        let coords = view.location.coordinates.unwrap();
        assert!((coords.lng - 85.3240).abs() < 1e-4);
        assert_eq!(view.photos.len(), 3);
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_photo_gps_never_overrides_map_click() {
        let geocoder = Arc::new(StaticGeocoder::found("Main St"));
        let service = service(geocoder.clone());
        let id = service.create_draft().await.unwrap().id;

        service
            .select_on_map(id, Coordinates::new(27.70, 85.32))
            .await
            .unwrap();
        let view = service
            .add_media(id, MediaKind::Photo, vec![tagged_photo("a.jpg", 2640)])
            .await
            .unwrap();
        assert_eq!(view.location.source, Some(LocationSource::Map));
        assert_eq!(view.location.coordinates, Some(Coordinates::new(27.70, 85.32)));
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_only_first_photo_of_first_batch_is_read() {
        let geocoder = Arc::new(StaticGeocoder::found("unused"));
        let service = service(geocoder.clone());
        let id = service.create_draft().await.unwrap().id;

        service
            .add_media(id, MediaKind::Photo, vec![photo("plain.jpg"), tagged_photo("b.jpg", 2640)])
            .await
            .unwrap();
        let view = service
            .add_media(id, MediaKind::Photo, vec![tagged_photo("c.jpg", 2640)])
            .await
            .unwrap();
        assert!(view.location.coordinates.is_none());
        assert_eq!(view.location.source, None);
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_submission_returns_to_review() {
        let received = Arc::new(Notify::new());
        let base = spawn_mock_server(stalled_reports_backend(received.clone())).await;
        let service = Arc::new(service_with(Arc::new(StaticGeocoder::found("Main St")), &base));
        let id = at_review(&service).await;

        let submitting = service.clone();
        let task = tokio::spawn(async move { submitting.submit(id, None).await });
        tokio::time::timeout(Duration::from_secs(5), received.notified())
            .await
            .expect("backend never saw the submission");
        assert!(service.get_draft(id).await.unwrap().submitting);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let view = service.get_draft(id).await.unwrap();
        assert!(!view.submitting);
        assert_eq!(view.step, WizardStep::Review);
        assert_eq!(view.details.title, "Pothole on Main St");

        assert!(service.back(id).await.is_ok());
        assert!(service
            .update_details(id, details("Pothole near market", "Still there and getting deeper"))
            .await
            .is_ok());
        assert!(service.discard_draft(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_discard_does_not_block_other_drafts() {
        let service = Arc::new(service(Arc::new(StaticGeocoder::missing())));
        let busy = service.create_draft().await.unwrap().id;
        let other = service.create_draft().await.unwrap().id;

        let handle = service.session(busy).await.unwrap();
        let guard = handle.lock().await;

        let discarding = service.clone();
        let discard = tokio::spawn(async move { discarding.discard_draft(busy).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let lookup = tokio::time::timeout(Duration::from_secs(1), service.get_draft(other)).await;
        assert!(lookup.expect("lookup stalled behind discard").is_ok());
        let created = tokio::time::timeout(Duration::from_secs(1), service.create_draft()).await;
        assert!(created.expect("create stalled behind discard").is_ok());

        drop(guard);
        assert!(discard.await.unwrap().is_ok());
        assert!(matches!(service.get_draft(busy).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_discards_release_once() {
        let service = Arc::new(service(Arc::new(StaticGeocoder::missing())));
        let id = service.create_draft().await.unwrap().id;
        service
            .add_media(id, MediaKind::Photo, vec![photo("a.jpg"), photo("b.jpg")])
            .await
            .unwrap();

        let (first, second) = tokio::join!(service.discard_draft(id), service.discard_draft(id));
        let mut released = 0;
        let mut not_found = 0;
        for outcome in [first, second] {
            match outcome {
                Ok(dto) => released += dto.released_previews,
                Err(AppError::NotFound(_)) => not_found += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(released, 2);
        assert_eq!(not_found, 1);
    }

    #[tokio::test]
    async fn test_draft_limit_refuses_until_one_is_discarded() {
        let config = WizardConfig {
            max_active_drafts: 2,
            ..Default::default()
        };
        let service = service_configured(
            Arc::new(StaticGeocoder::missing()),
            "http://127.0.0.1:9",
            config,
        );
        let first = service.create_draft().await.unwrap().id;
        service.create_draft().await.unwrap();

        assert!(matches!(
            service.create_draft().await,
            Err(AppError::ServiceUnavailable(_))
        ));
        assert_eq!(service.session_count().await, 2);

        service.discard_draft(first).await.unwrap();
        assert!(service.create_draft().await.is_ok());
    }
}
