use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// What kind of asset is being stored. Hosts that transcode (Cloudinary)
/// treat images and videos as distinct resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Key prefix used by backends that lay assets out by kind.
    pub fn folder(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }
}

/// A local file waiting to be pushed to the media host.
#[derive(Debug, Clone, Copy)]
pub struct MediaUpload<'a> {
    /// Path of the temporary file written by the HTTP layer.
    pub path: &'a Path,
    /// Client-supplied filename, used for the extension and content type.
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub kind: MediaKind,
}

impl<'a> MediaUpload<'a> {
    pub fn new(path: &'a Path, kind: MediaKind) -> Self {
        Self {
            path,
            file_name: None,
            content_type: None,
            kind,
        }
    }

    pub fn with_file_name(mut self, file_name: Option<&'a str>) -> Self {
        self.file_name = file_name;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&'a str>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Lowercased extension of the client filename, including the dot.
    pub fn extension(&self) -> String {
        self.file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// What the media host reported for a stored file.
///
/// Fields are optional because hosts may answer successfully without them;
/// callers decide whether an incomplete answer is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedMedia {
    pub url: Option<String>,
    pub storage_id: Option<String>,
    /// Playback length in seconds, reported for videos only.
    pub duration: Option<f64>,
}

impl UploadedMedia {
    /// The durable `{url, storage_id}` pair, if both were reported.
    pub fn asset(&self) -> Option<MediaAsset> {
        match (self.url.as_deref(), self.storage_id.as_deref()) {
            (Some(url), Some(id)) if !url.is_empty() && !id.is_empty() => Some(MediaAsset {
                url: url.to_owned(),
                storage_id: id.to_owned(),
            }),
            _ => None,
        }
    }
}

/// A stored asset: where to fetch it and how to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub url: String,
    pub storage_id: String,
}

/// Remote (or local) host for uploaded images and videos.
#[async_trait]
pub trait MediaRelay: Send + Sync {
    /// Push a local file to the host.
    async fn upload(&self, upload: MediaUpload<'_>) -> Result<UploadedMedia, MediaError>;

    /// Delete a stored asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, storage_id: &str, kind: MediaKind) -> Result<bool, MediaError>;
}
