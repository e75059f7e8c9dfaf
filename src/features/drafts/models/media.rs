use std::collections::HashMap;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::{MAX_PHOTOS, MAX_PHOTO_SIZE, MAX_VIDEOS, MAX_VIDEO_SIZE};

/// Which media collection of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MediaKind {
    #[serde(rename = "photos")]
    Photo,
    #[serde(rename = "videos")]
    Video,
}

impl MediaKind {
    pub fn max_items(self) -> usize {
        match self {
            MediaKind::Photo => MAX_PHOTOS,
            MediaKind::Video => MAX_VIDEOS,
        }
    }

    pub fn max_size(self) -> usize {
        match self {
            MediaKind::Photo => MAX_PHOTO_SIZE,
            MediaKind::Video => MAX_VIDEO_SIZE,
        }
    }

    /// Multipart field name used by the backend
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
        }
    }

    /// Accepts any well-formed `image/*` (photos) or `video/*` (videos) type
    pub fn accepts(self, content_type: &str) -> bool {
        let Some((top, sub)) = content_type.split_once('/') else {
            return false;
        };
        if sub.trim().is_empty() {
            return false;
        }
        match self {
            MediaKind::Photo => top.eq_ignore_ascii_case("image"),
            MediaKind::Video => top.eq_ignore_ascii_case("video"),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Local reference to a selected file's displayable copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PreviewHandle(Uuid);

impl PreviewHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for PreviewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file as received from the client
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A file held by a draft
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub preview: PreviewHandle,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("No files were provided")]
    Empty,

    #[error("You can attach at most {max} {kind}")]
    TooMany { kind: MediaKind, max: usize },

    #[error("'{file_name}' has unsupported type '{content_type}' for {kind}")]
    UnsupportedType {
        kind: MediaKind,
        file_name: String,
        content_type: String,
    },

    #[error("'{file_name}' is too large. Maximum size is {max_mb} MB")]
    TooLarge { file_name: String, max_mb: usize },

    #[error("There is no {kind} entry at position {index}")]
    NotFound { kind: MediaKind, index: usize },
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotFound { .. } => AppError::NotFound(e.to_string()),
            _ => AppError::Validation(e.to_string()),
        }
    }
}

/// Outstanding preview copies. Each handle is released at most once.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<PreviewHandle, (String, Bytes)>,
    released: usize,
}

impl PreviewRegistry {
    fn issue(&mut self, content_type: &str, data: Bytes) -> PreviewHandle {
        let handle = PreviewHandle::new();
        self.live.insert(handle, (content_type.to_string(), data));
        handle
    }

    fn release(&mut self, handle: PreviewHandle) -> bool {
        let released = self.live.remove(&handle).is_some();
        if released {
            self.released += 1;
        }
        released
    }

    fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        self.released += count;
        count
    }

    pub fn get(&self, handle: PreviewHandle) -> Option<(&str, Bytes)> {
        self.live
            .get(&handle)
            .map(|(content_type, data)| (content_type.as_str(), data.clone()))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total previews released over the lifetime of this registry
    pub fn released_count(&self) -> usize {
        self.released
    }
}

/// Bounded photo and video collections of a draft
#[derive(Debug, Default)]
pub struct MediaIntake {
    photos: Vec<MediaFile>,
    videos: Vec<MediaFile>,
    previews: PreviewRegistry,
}

impl MediaIntake {
    pub fn files(&self, kind: MediaKind) -> &[MediaFile] {
        match kind {
            MediaKind::Photo => &self.photos,
            MediaKind::Video => &self.videos,
        }
    }

    fn files_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaFile> {
        match kind {
            MediaKind::Photo => &mut self.photos,
            MediaKind::Video => &mut self.videos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.videos.is_empty()
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Append `incoming` to the `kind` collection, one preview per file in order.
    ///
    /// The batch is all-or-nothing: on any error the collection is unchanged.
    pub fn add(
        &mut self,
        kind: MediaKind,
        incoming: Vec<IncomingFile>,
    ) -> Result<Vec<PreviewHandle>, MediaError> {
        if incoming.is_empty() {
            return Err(MediaError::Empty);
        }

        for file in &incoming {
            if !kind.accepts(&file.content_type) {
                return Err(MediaError::UnsupportedType {
                    kind,
                    file_name: file.file_name.clone(),
                    content_type: file.content_type.clone(),
                });
            }
            if file.data.len() > kind.max_size() {
                return Err(MediaError::TooLarge {
                    file_name: file.file_name.clone(),
                    max_mb: kind.max_size() / 1024 / 1024,
                });
            }
        }

        if self.files(kind).len() + incoming.len() > kind.max_items() {
            return Err(MediaError::TooMany {
                kind,
                max: kind.max_items(),
            });
        }

        let mut handles = Vec::with_capacity(incoming.len());
        for file in incoming {
            let preview = self.previews.issue(&file.content_type, file.data.clone());
            handles.push(preview);
            self.files_mut(kind).push(MediaFile {
                file_name: file.file_name,
                content_type: file.content_type,
                data: file.data,
                preview,
            });
        }
        Ok(handles)
    }

    /// Remove the entry at `index`; later entries shift down by one.
    pub fn remove(&mut self, kind: MediaKind, index: usize) -> Result<MediaFile, MediaError> {
        if index >= self.files(kind).len() {
            return Err(MediaError::NotFound { kind, index });
        }
        let file = self.files_mut(kind).remove(index);
        self.previews.release(file.preview);
        Ok(file)
    }

    /// Drop every file and release every outstanding preview. Returns how many were released.
    pub fn teardown(&mut self) -> usize {
        self.photos.clear();
        self.videos.clear();
        self.previews.release_all()
    }
}
