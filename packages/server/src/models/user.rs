use axum_typed_multipart::TryFromMultipart;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{MediaResponse, non_blank, required};
use crate::entity::user;
use crate::error::AppError;
use crate::extractors::multipart::TempUpload;

/// Multipart body for user registration.
#[derive(TryFromMultipart)]
pub struct RegisterForm {
    #[form_data(field_name = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[form_data(limit = "unlimited")]
    pub avatar: Option<TempUpload>,
    #[form_data(field_name = "coverImage", limit = "unlimited")]
    pub cover_image: Option<TempUpload>,
}

/// Registration fields after trimming and case folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Validate the text fields and return them with the required avatar part.
pub fn validate_register_form(form: &RegisterForm) -> Result<(NewUser, &TempUpload), AppError> {
    const MISSING: &str = "All fields are required";

    let full_name = required(form.full_name.as_deref(), MISSING)?;
    let email = required(form.email.as_deref(), MISSING)?;
    let username = required(form.username.as_deref(), MISSING)?;
    let password = required(form.password.as_deref(), MISSING)?;

    if !email.contains('@') {
        return Err(AppError::Validation("Email is invalid".into()));
    }
    let avatar = form
        .avatar
        .as_ref()
        .ok_or_else(|| AppError::Validation("Avatar file is required".into()))?;

    let user = NewUser {
        full_name: full_name.to_string(),
        email: email.to_lowercase(),
        username: username.to_lowercase(),
        password: password.to_string(),
    };
    Ok((user, avatar))
}

/// Request body for login. At least one of `username` or `email` is required.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[schema(example = "s3cure_P@ss!")]
    pub password: Option<String>,
}

/// Lookup keys for a login attempt, already lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<Credentials, AppError> {
    let username = non_blank(payload.username.as_deref()).map(str::to_lowercase);
    let email = non_blank(payload.email.as_deref()).map(str::to_lowercase);
    if username.is_none() && email.is_none() {
        return Err(AppError::Validation("Username or email is required".into()));
    }

    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".into()))?;

    Ok(Credentials {
        username,
        email,
        password: password.to_string(),
    })
}

/// Optional body for the refresh endpoint; the cookie is used when absent.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub fn validate_change_password(payload: &ChangePasswordRequest) -> Result<(String, String), AppError> {
    let old = payload.old_password.as_deref().filter(|p| !p.is_empty());
    let new = payload.new_password.as_deref().filter(|p| !p.is_empty());
    match (old, new) {
        (Some(old), Some(new)) => Ok((old.to_string(), new.to_string())),
        _ => Err(AppError::Validation(
            "Old password and new password are required".into(),
        )),
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[schema(example = "Alice Liddell")]
    pub full_name: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
}

/// Returns `(full_name, email)` with the email lowercased.
pub fn validate_update_account(payload: &UpdateAccountRequest) -> Result<(String, String), AppError> {
    const MISSING: &str = "All fields are required";
    let full_name = required(payload.full_name.as_deref(), MISSING)?;
    let email = required(payload.email.as_deref(), MISSING)?;
    if !email.contains('@') {
        return Err(AppError::Validation("Email is invalid".into()));
    }
    Ok((full_name.to_string(), email.to_lowercase()))
}

#[derive(TryFromMultipart)]
pub struct AvatarForm {
    #[form_data(limit = "unlimited")]
    pub avatar: Option<TempUpload>,
}

#[derive(TryFromMultipart)]
pub struct CoverImageForm {
    #[form_data(field_name = "coverImage", limit = "unlimited")]
    pub cover_image: Option<TempUpload>,
}

/// Public view of a user. Password hash and refresh token are never included.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice Liddell")]
    pub full_name: String,
    pub avatar: MediaResponse,
    pub cover_image: Option<MediaResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn cover_of(user: &user::Model) -> Option<MediaResponse> {
    match (&user.cover_image_url, &user.cover_image_storage_id) {
        (Some(url), Some(id)) => Some(MediaResponse::new(url.clone(), id.clone())),
        _ => None,
    }
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        let cover_image = cover_of(&user);
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: MediaResponse::new(user.avatar_url, user.avatar_storage_id),
            cover_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Returned by login and refresh; the same tokens are also set as cookies.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Public channel page with subscription counts.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: MediaResponse,
    pub cover_image: Option<MediaResponse>,
    #[schema(example = 3)]
    pub subscriber_count: u64,
    #[schema(example = 1)]
    pub subscribed_channel_count: u64,
    /// Whether the requesting user follows this channel; `false` when anonymous.
    pub is_subscribed: bool,
}

impl ChannelProfileResponse {
    pub fn new(user: user::Model, subscriber_count: u64, subscribed_channel_count: u64, is_subscribed: bool) -> Self {
        let cover_image = cover_of(&user);
        Self {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            avatar: MediaResponse::new(user.avatar_url, user.avatar_storage_id),
            cover_image,
            subscriber_count,
            subscribed_channel_count,
            is_subscribed,
        }
    }
}

/// Owner fields inlined into watch-history entries.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    /// Avatar URL.
    pub avatar: String,
}

impl From<user::Model> for OwnerProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            avatar: user.avatar_url,
        }
    }
}
