use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::MediaError;
use sea_orm::DbErr;
use serde::Serialize;

/// Uniform error envelope returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body.
    #[schema(example = 400)]
    pub status_code: u16,
    /// Always `null` on failure.
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    /// Human-readable error description.
    #[schema(example = "All fields are required")]
    pub message: String,
    /// Always `false` on failure.
    pub success: bool,
    /// Machine-readable error codes. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `TOKEN_REUSED`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`,
    /// `NOT_FOUND`, `CONFLICT`, `UPLOAD_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = json!(["VALIDATION_ERROR"]))]
    pub error: Vec<String>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            message: message.into(),
            success: false,
            error: vec![code.to_string()],
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    /// A validly signed refresh token that is no longer the user's current one.
    TokenReused,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    /// The media host answered without a usable URL or storage id.
    Upload(String),
    /// The media host could not be reached or rejected the file.
    MediaHost(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Unauthorized request".into(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
            ),
            AppError::TokenReused => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_REUSED",
                "Refresh token is expired or used".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid user credentials".into(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "You are not allowed to modify this resource".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Upload(msg) => (StatusCode::BAD_REQUEST, "UPLOAD_FAILED", msg),
            AppError::MediaHost(detail) => {
                tracing::error!("Media host error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPLOAD_FAILED",
                    "Media upload failed".into(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                )
            }
        };
        (status, ErrorBody::new(status, code, message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::MediaHost(err.to_string())
    }
}
