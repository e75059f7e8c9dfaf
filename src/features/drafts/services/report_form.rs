use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::core::config::LocationEncoding;
use crate::core::error::{AppError, Result};
use crate::features::drafts::models::{MediaKind, ReportDraft};
use crate::shared::form::{flatten_bracketed, unflatten_bracketed};

#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        content_type: String,
        data: Bytes,
    },
}

/// The multipart body of a create-report request, in send order
#[derive(Debug, Clone)]
pub struct ReportForm {
    parts: Vec<FormPart>,
    encoding: LocationEncoding,
}

impl ReportForm {
    pub fn from_draft(draft: &ReportDraft, encoding: LocationEncoding) -> Self {
        let details = &draft.details;
        let mut parts = Vec::new();
        let mut text = |name: &str, value: String| {
            parts.push(FormPart::Text {
                name: name.to_string(),
                value,
            })
        };

        text("title", details.title.clone());
        text("description", details.description.clone());
        text("category", details.category.to_string());
        text("severity", details.severity.to_string());
        text("priority", details.priority.to_string());
        if let Some(municipality_id) = &details.municipality_id {
            text("municipalityId", municipality_id.clone());
        }
        if let Some(due_date) = details.due_date {
            text("dueDate", due_date.format("%Y-%m-%d").to_string());
        }

        let location = Self::location_value(draft);
        match encoding {
            LocationEncoding::Bracketed => {
                for (name, value) in flatten_bracketed("location", &location) {
                    text(&name, value);
                }
            }
            LocationEncoding::Json => text("location", location.to_string()),
        }

        for kind in [MediaKind::Photo, MediaKind::Video] {
            for file in draft.media.files(kind) {
                parts.push(FormPart::File {
                    name: kind.field_name(),
                    file_name: file.file_name.clone(),
                    content_type: file.content_type.clone(),
                    data: file.data.clone(),
                });
            }
        }

        Self { parts, encoding }
    }

    fn location_value(draft: &ReportDraft) -> Value {
        let location = &draft.location;
        let mut value = json!({
            "address": location.address(),
            "ward": location.ward().unwrap_or_default(),
        });
        if let Some(coords) = location.coordinates() {
            value["coordinates"] = json!({ "lat": coords.lat, "lng": coords.lng });
        }
        value
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// First text value sent under `name`
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_fields()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn text_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().filter_map(|part| match part {
            FormPart::Text { name, value } => Some((name.as_str(), value.as_str())),
            FormPart::File { .. } => None,
        })
    }

    /// `(field, file name)` of every file part, in send order
    pub fn file_names(&self) -> Vec<(&'static str, &str)> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                FormPart::File {
                    name, file_name, ..
                } => Some((*name, file_name.as_str())),
                FormPart::Text { .. } => None,
            })
            .collect()
    }

    /// The text fields re-nested the way the backend reads them
    pub fn to_nested_json(&self) -> Value {
        let mut nested = unflatten_bracketed(self.text_fields());
        if self.encoding == LocationEncoding::Json {
            let parsed = nested
                .get("location")
                .and_then(Value::as_str)
                .and_then(|raw| serde_json::from_str::<Value>(raw).ok());
            if let Some(location) = parsed {
                nested["location"] = location;
            }
        }
        nested
    }

    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| {
                            AppError::Internal(format!(
                                "Invalid content type '{}': {}",
                                content_type, e
                            ))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
