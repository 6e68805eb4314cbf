use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::error::MediaError;
use super::traits::{MediaKind, MediaRelay, MediaUpload, UploadedMedia};
use crate::config::CloudinaryConfig;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Media relay backed by the Cloudinary upload API.
pub struct CloudinaryRelay {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryRelay {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(MediaError::Config(
                "cloudinary requires cloud_name, api_key and api_secret".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("vidtube/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        let base = self
            .config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!(
            "{base}/{}/{}/{action}",
            self.config.cloud_name,
            kind.as_str()
        )
    }

    /// Parameters every signed call carries, with the signature appended.
    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.config.api_secret);
        params.insert("signature", signature);
        params.insert("api_key", self.config.api_key.clone());
        params
    }

    async fn remote_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "unreadable error body".into(),
        };
        MediaError::Remote { status, message }
    }
}

/// Cloudinary request signature: SHA-1 over the `&`-joined, key-sorted
/// `key=value` pairs followed by the API secret.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaRelay for CloudinaryRelay {
    async fn upload(&self, upload: MediaUpload<'_>) -> Result<UploadedMedia, MediaError> {
        let bytes = tokio::fs::read(upload.path).await?;

        let mut params = BTreeMap::new();
        if let Some(folder) = self.config.folder.as_ref().filter(|f| !f.is_empty()) {
            params.insert("folder", folder.clone());
        }
        let params = self.signed_params(params);

        let mut part = Part::bytes(bytes)
            .file_name(upload.file_name.unwrap_or("upload").to_string());
        if let Some(content_type) = upload.content_type {
            part = part.mime_str(content_type)?;
        }

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint(upload.kind, "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response).await);
        }

        let body: UploadResponse = response.json().await?;
        tracing::debug!(public_id = ?body.public_id, kind = upload.kind.as_str(), "Uploaded to cloudinary");

        Ok(UploadedMedia {
            url: body.secure_url,
            storage_id: body.public_id,
            duration: body.duration,
        })
    }

    async fn delete(&self, storage_id: &str, kind: MediaKind) -> Result<bool, MediaError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", storage_id.to_string());
        let params = self.signed_params(params);

        let response = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(true),
            "not found" => Ok(false),
            other => Err(MediaError::Remote {
                status: 200,
                message: format!("unexpected destroy result: {other}"),
            }),
        }
    }
}
