use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// Uniform success envelope returned by every endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    #[schema(example = 200)]
    pub status_code: u16,
    pub data: T,
    #[schema(example = "Success")]
    pub message: String,
    /// `true` for any status below 400.
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Empty `data` payload, serialized as `{}`.
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct Empty {}

/// Stored media reference as exposed to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/avatars/abc.png")]
    pub url: String,
    /// Identifier used by the media host to delete the asset.
    #[schema(example = "avatars/abc")]
    pub storage_id: String,
}

impl MediaResponse {
    pub fn new(url: String, storage_id: String) -> Self {
        Self { url, storage_id }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Trim an optional form field, treating blank input as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Like [`non_blank`] but fails with `message` when the field is missing.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    non_blank(value).ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Parse a path or query id, rejecting malformed values before any database work.
pub fn parse_id(raw: &str, what: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("Invalid {what}")))
}
