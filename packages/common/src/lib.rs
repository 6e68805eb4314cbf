pub mod config;
pub mod media;

pub use config::MediaConfig;
pub use media::{MediaAsset, MediaError, MediaKind, MediaRelay, MediaUpload, UploadedMedia};
