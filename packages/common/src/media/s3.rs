use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use uuid::Uuid;

use super::error::MediaError;
use super::traits::{MediaKind, MediaRelay, MediaUpload, UploadedMedia};
use crate::config::S3MediaConfig;

/// Media relay backed by an S3-compatible bucket (AWS, MinIO, R2, ...).
///
/// Objects are keyed `{images|videos}/{uuid}{ext}` and served from
/// `{public_base_url}/{key}`. No duration is reported for videos.
pub struct S3Relay {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3Relay {
    pub fn new(config: &S3MediaConfig) -> Result<Self, MediaError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| MediaError::Config(e.to_string()))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| MediaError::Config(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MediaRelay for S3Relay {
    async fn upload(&self, upload: MediaUpload<'_>) -> Result<UploadedMedia, MediaError> {
        let key = format!(
            "{}/{}{}",
            upload.kind.folder(),
            Uuid::now_v7(),
            upload.extension()
        );
        let bytes = tokio::fs::read(upload.path).await?;
        let content_type = upload
            .content_type
            .unwrap_or("application/octet-stream");

        let response = self
            .bucket
            .put_object_with_content_type(&key, &bytes, content_type)
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(MediaError::Remote {
                status,
                message: format!("put_object {key} failed"),
            });
        }

        Ok(UploadedMedia {
            url: Some(format!("{}/{}", self.public_base_url, key)),
            storage_id: Some(key),
            duration: None,
        })
    }

    async fn delete(&self, storage_id: &str, _kind: MediaKind) -> Result<bool, MediaError> {
        let response = self
            .bucket
            .delete_object(storage_id)
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))?;

        match response.status_code() {
            200..=299 => Ok(true),
            404 => Ok(false),
            status => Err(MediaError::Remote {
                status,
                message: format!("delete_object {storage_id} failed"),
            }),
        }
    }
}
