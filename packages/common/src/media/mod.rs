mod error;
mod traits;

pub mod cloudinary;
pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::MediaError;
pub use traits::{MediaAsset, MediaKind, MediaRelay, MediaUpload, UploadedMedia};

use std::sync::Arc;

use crate::config::MediaConfig;

/// Build the process-wide media relay for the configured backend.
pub async fn build_relay(config: &MediaConfig) -> Result<Arc<dyn MediaRelay>, MediaError> {
    let relay: Arc<dyn MediaRelay> = match config {
        MediaConfig::Filesystem(cfg) => Arc::new(
            filesystem::FilesystemRelay::new(cfg.root.clone(), cfg.public_base_url.clone())
                .await?,
        ),
        MediaConfig::Cloudinary(cfg) => Arc::new(cloudinary::CloudinaryRelay::new(cfg.clone())?),
        #[cfg(feature = "object-storage")]
        MediaConfig::S3(cfg) => Arc::new(s3::S3Relay::new(cfg)?),
        #[cfg(not(feature = "object-storage"))]
        MediaConfig::S3(_) => {
            return Err(MediaError::Config(
                "S3 backend requires the `object-storage` feature".into(),
            ));
        }
    };
    Ok(relay)
}
