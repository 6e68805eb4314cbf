use axum::extract::{FromRequest, Request};
use axum_typed_multipart::{FieldData, TypedMultipart, TypedMultipartError};
use common::{MediaKind, MediaUpload};
use tempfile::NamedTempFile;

use crate::error::AppError;

/// A file part spooled to a temporary file by the multipart parser. The file is
/// removed when the value is dropped, i.e. at the end of the request.
pub type TempUpload = FieldData<NamedTempFile>;

/// A `TypedMultipart<T>` wrapper that reports malformed forms as `AppError::Validation`.
pub struct AppMultipart<T>(pub T);

impl<S, T> FromRequest<S> for AppMultipart<T>
where
    TypedMultipart<T>: FromRequest<S, Rejection = TypedMultipartError>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let TypedMultipart(value) = TypedMultipart::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart form: {e}")))?;
        Ok(AppMultipart(value))
    }
}

/// Describe a spooled part as a media upload of the given kind.
pub fn media_upload(file: &TempUpload, kind: MediaKind) -> MediaUpload<'_> {
    MediaUpload::new(file.contents.path(), kind)
        .with_file_name(file.metadata.file_name.as_deref())
        .with_content_type(file.metadata.content_type.as_deref())
}
