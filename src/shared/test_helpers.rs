#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
#[cfg(test)]
use serde_json::{json, Value};
#[cfg(test)]
use tokio::sync::Notify;

#[cfg(test)]
use crate::core::config::{BackendConfig, GeocodingConfig, LocationEncoding};
#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::geolocation::models::Coordinates;
#[cfg(test)]
use crate::features::geolocation::services::{ResolvedAddress, ReverseGeocoder};

/// Serve `router` on an ephemeral local port and return its base URL
#[cfg(test)]
pub async fn spawn_mock_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{}", addr)
}

/// Municipal backend stand-in: `POST /reports` answers 201 with the text fields
/// re-nested from their bracketed names and the `field:file_name` of every file part
#[cfg(test)]
pub fn mock_reports_backend() -> Router {
    Router::new().route(
        "/reports",
        post(|mut multipart: Multipart| async move {
            let mut fields: Vec<(String, String)> = Vec::new();
            let mut files: Vec<String> = Vec::new();
            while let Some(field) = multipart.next_field().await.expect("multipart field") {
                let name = field.name().unwrap_or_default().to_string();
                match field.file_name().map(str::to_string) {
                    Some(file_name) => {
                        field.bytes().await.expect("file bytes");
                        files.push(format!("{}:{}", name, file_name));
                    }
                    None => fields.push((name, field.text().await.expect("text field"))),
                }
            }
            let nested = crate::shared::form::unflatten_bracketed(
                fields.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "data": { "id": "report-1", "fields": nested, "files": files }
                })),
            )
        }),
    )
}

/// Backend stand-in whose `POST /reports` signals `received` and never answers
#[cfg(test)]
pub fn stalled_reports_backend(received: Arc<Notify>) -> Router {
    Router::new().route(
        "/reports",
        post(move || {
            let received = received.clone();
            async move {
                received.notify_one();
                std::future::pending::<StatusCode>().await
            }
        }),
    )
}

/// Minimal TIFF carrying only GPS latitude/longitude tags, given as
/// degrees/minutes/seconds rationals plus hemisphere references
#[cfg(test)]
pub fn gps_tagged_tiff(
    lat: [(u32, u32); 3],
    lat_ref: &str,
    lng: [(u32, u32); 3],
    lng_ref: &str,
) -> Vec<u8> {
    use exif::experimental::Writer;
    use exif::{Field, In, Rational, Tag, Value as ExifValue};

    let rational = |tag: Tag, parts: [(u32, u32); 3]| Field {
        tag,
        ifd_num: In::PRIMARY,
        value: ExifValue::Rational(parts.iter().map(|&p| Rational::from(p)).collect()),
    };
    let ascii = |tag: Tag, value: &str| Field {
        tag,
        ifd_num: In::PRIMARY,
        value: ExifValue::Ascii(vec![value.as_bytes().to_vec()]),
    };

    let fields = [
        rational(Tag::GPSLatitude, lat),
        ascii(Tag::GPSLatitudeRef, lat_ref),
        rational(Tag::GPSLongitude, lng),
        ascii(Tag::GPSLongitudeRef, lng_ref),
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = std::io::Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("write tiff");
    buf.into_inner()
}

/// Backend stand-in whose `POST /reports` always fails with `status` and `body`
#[cfg(test)]
pub fn failing_reports_backend(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        "/reports",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    )
}

#[cfg(test)]
pub fn test_geocoding_config() -> GeocodingConfig {
    GeocodingConfig {
        nominatim_base_url: "http://127.0.0.1:9".to_string(),
        user_agent: "civic-report-gateway-tests".to_string(),
        timeout: Duration::from_secs(5),
        locationiq_base_url: "http://127.0.0.1:9".to_string(),
        locationiq_api_key: None,
    }
}

#[cfg(test)]
pub fn test_backend_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout: Duration::from_secs(5),
        location_encoding: LocationEncoding::Bracketed,
    }
}

/// Geocoder with a fixed answer that counts its calls
#[cfg(test)]
pub struct StaticGeocoder {
    answer: Option<Option<String>>,
    calls: AtomicUsize,
}

#[cfg(test)]
#[allow(dead_code)]
impl StaticGeocoder {
    pub fn found(display_name: &str) -> Self {
        Self {
            answer: Some(Some(display_name.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            answer: Some(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ReverseGeocoder for StaticGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> Result<Option<ResolvedAddress>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Some(answer) => Ok(answer.clone().map(|display_name| ResolvedAddress {
                display_name,
                city: None,
                bounding_box: None,
            })),
            None => Err(AppError::ExternalServiceError(
                "geocoder unavailable".to_string(),
            )),
        }
    }
}

/// Geocoder that blocks until released, for ordering tests
#[cfg(test)]
pub struct GatedGeocoder {
    display_name: String,
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[cfg(test)]
impl GatedGeocoder {
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ReverseGeocoder for GatedGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> Result<Option<ResolvedAddress>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(Some(ResolvedAddress {
            display_name: self.display_name.clone(),
            city: None,
            bounding_box: None,
        }))
    }
}
