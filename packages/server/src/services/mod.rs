pub mod content;
pub mod profile;
pub mod session;

use common::{MediaAsset, MediaKind, MediaRelay, MediaUpload};
use tracing::warn;

use crate::error::AppError;

/// Upload a file and insist on a complete `{url, storage_id}` answer.
pub(crate) async fn upload_asset(
    media: &dyn MediaRelay,
    upload: MediaUpload<'_>,
    failure: &str,
) -> Result<(MediaAsset, Option<f64>), AppError> {
    let uploaded = media.upload(upload).await?;
    let asset = uploaded
        .asset()
        .ok_or_else(|| AppError::Upload(failure.to_string()))?;
    Ok((asset, uploaded.duration))
}

/// Delete a stored asset, logging instead of failing.
pub(crate) async fn discard_asset(media: &dyn MediaRelay, storage_id: &str, kind: MediaKind) {
    match media.delete(storage_id, kind).await {
        Ok(true) => tracing::debug!("Deleted {} asset {}", kind.as_str(), storage_id),
        Ok(false) => warn!("{} asset {} was already gone", kind.as_str(), storage_id),
        Err(e) => warn!("Failed to delete {} asset {}: {}", kind.as_str(), storage_id, e),
    }
}
