use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::error::MediaError;
use super::traits::{MediaKind, MediaRelay, MediaUpload, UploadedMedia};

/// Media relay that keeps assets on local disk.
///
/// Assets are laid out as `{root}/{images|videos}/{uuid}{ext}`; the storage id
/// is the path relative to `root` and the URL is `{public_base_url}/{storage_id}`.
/// Intended for development and tests, with the server exposing `root` as
/// static files.
pub struct FilesystemRelay {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemRelay {
    pub async fn new(root: PathBuf, public_base_url: String) -> Result<Self, MediaError> {
        fs::create_dir_all(root.join(MediaKind::Image.folder())).await?;
        fs::create_dir_all(root.join(MediaKind::Video.folder())).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a storage id to a path under `root`, rejecting anything that
    /// could escape it.
    fn asset_path(&self, storage_id: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(storage_id);
        let is_plain = !storage_id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(MediaError::InvalidStorageId(storage_id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaRelay for FilesystemRelay {
    async fn upload(&self, upload: MediaUpload<'_>) -> Result<UploadedMedia, MediaError> {
        let storage_id = format!(
            "{}/{}{}",
            upload.kind.folder(),
            Uuid::now_v7(),
            upload.extension()
        );
        let target = self.asset_path(&storage_id)?;

        // Copy then rename so a half-written asset is never visible.
        let temp_path = self.temp_path();
        if let Err(e) = fs::copy(upload.path, &temp_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(UploadedMedia {
            url: Some(format!("{}/{}", self.public_base_url, storage_id)),
            storage_id: Some(storage_id),
            duration: None,
        })
    }

    async fn delete(&self, storage_id: &str, _kind: MediaKind) -> Result<bool, MediaError> {
        let path = self.asset_path(storage_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
