use axum::extract::{Path, State};
use axum_extra::extract::cookie::CookieJar;
use common::MediaKind;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::multipart::{AppMultipart, media_upload};
use crate::models::shared::{ApiResponse, Empty};
use crate::models::user::{
    AvatarForm, ChangePasswordRequest, ChannelProfileResponse, CoverImageForm, LoginRequest,
    LoginResponse, RefreshRequest, RegisterForm, TokenResponse, UpdateAccountRequest,
    UserResponse, validate_change_password, validate_login_request, validate_register_form,
    validate_update_account,
};
use crate::models::video::WatchedVideo;
use crate::services::profile::{ProfileImage, ProfileService};
use crate::services::session::SessionService;
use crate::state::AppState;
use crate::utils::cookies::{self, REFRESH_COOKIE};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Creates an account. `avatar` is required, `coverImage` is optional. \
        Username and email are stored lowercase and must be unique.",
    request_body(content_type = "multipart/form-data", description = "fullName, email, username, password, avatar, coverImage"),
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    AppMultipart(form): AppMultipart<RegisterForm>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let (new_user, avatar) = validate_register_form(&form)?;

    let user = SessionService::new(&state)
        .register(
            new_user,
            media_upload(avatar, MediaKind::Image),
            form.cover_image
                .as_ref()
                .map(|f| media_upload(f, MediaKind::Image)),
        )
        .await?;

    Ok(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully",
    ))
}

/// Log in with username or email.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "loginUser",
    summary = "Log in",
    description = "Verifies credentials and issues an access/refresh token pair. \
        Both tokens are returned in the body and set as HttpOnly cookies. \
        Any previous session of the user is invalidated.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "No such user (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let credentials = validate_login_request(&payload)?;

    let (user, tokens) = SessionService::new(&state).login(credentials).await?;

    let jar = cookies::with_session(jar, &tokens, &state.config.auth);
    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user: user.into(),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Users",
    operation_id = "logoutUser",
    summary = "Log out",
    description = "Clears the stored refresh token and both session cookies.",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<Empty>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, jar), fields(user_id = %auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Empty>), AppError> {
    SessionService::new(&state).logout(auth_user.user_id).await?;

    Ok((
        cookies::without_session(jar, &state.config.auth),
        ApiResponse::ok(Empty::default(), "User logged out"),
    ))
}

/// Rotate the refresh token.
#[utoipa::path(
    post,
    path = "/refresh-token",
    tag = "Users",
    operation_id = "refreshAccessToken",
    summary = "Refresh the session",
    description = "Takes the refresh token from the `refreshToken` cookie or the JSON body, \
        and returns a new token pair. A token that is not the user's current one is rejected.",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Missing, invalid or reused token (TOKEN_MISSING, TOKEN_INVALID, TOKEN_REUSED)", body = ErrorBody),
    ),
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<AppJson<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<TokenResponse>), AppError> {
    let incoming = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.and_then(|AppJson(b)| b.refresh_token));

    let tokens = SessionService::new(&state).refresh(incoming).await?;

    let jar = cookies::with_session(jar, &tokens, &state.config.auth);
    Ok((
        jar,
        ApiResponse::ok(
            TokenResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "Access token refreshed",
        ),
    ))
}

/// Change the password of the logged-in user.
#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 400, description = "Missing fields or wrong old password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (old_password, new_password) = validate_change_password(&payload)?;

    SessionService::new(&state)
        .change_password(auth_user.user_id, old_password, new_password)
        .await?;

    Ok(ApiResponse::ok(Empty::default(), "Password changed successfully"))
}

/// Return the logged-in user.
#[utoipa::path(
    get,
    path = "/current-user",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn current_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = ProfileService::new(&state).current_user(auth_user.user_id).await?;
    Ok(ApiResponse::ok(user.into(), "Current user fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/update-account",
    tag = "Users",
    operation_id = "updateAccountDetails",
    summary = "Update full name and email",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let (full_name, email) = validate_update_account(&payload)?;

    let user = ProfileService::new(&state)
        .update_account(auth_user.user_id, full_name, email)
        .await?;

    Ok(ApiResponse::ok(user.into(), "Account details updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/avatar",
    tag = "Users",
    operation_id = "updateUserAvatar",
    summary = "Replace the avatar",
    request_body(content_type = "multipart/form-data", description = "avatar"),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing file or failed upload (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn update_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppMultipart(form): AppMultipart<AvatarForm>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let file = form
        .avatar
        .as_ref()
        .ok_or_else(|| AppError::Validation("Avatar file is missing".into()))?;

    let user = ProfileService::new(&state)
        .update_image(
            auth_user.user_id,
            ProfileImage::Avatar,
            media_upload(file, MediaKind::Image),
        )
        .await?;

    Ok(ApiResponse::ok(user.into(), "Avatar updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/cover-image",
    tag = "Users",
    operation_id = "updateUserCoverImage",
    summary = "Replace the cover image",
    request_body(content_type = "multipart/form-data", description = "coverImage"),
    responses(
        (status = 200, description = "Cover image updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing file or failed upload (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn update_cover_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppMultipart(form): AppMultipart<CoverImageForm>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let file = form
        .cover_image
        .as_ref()
        .ok_or_else(|| AppError::Validation("Cover image file is missing".into()))?;

    let user = ProfileService::new(&state)
        .update_image(
            auth_user.user_id,
            ProfileImage::CoverImage,
            media_upload(file, MediaKind::Image),
        )
        .await?;

    Ok(ApiResponse::ok(user.into(), "Cover image updated successfully"))
}

/// Public channel page.
#[utoipa::path(
    get,
    path = "/channel/{username}",
    tag = "Users",
    operation_id = "getUserChannelProfile",
    summary = "Get a channel profile",
    description = "Returns the channel's public fields with subscriber counts. \
        `isSubscribed` reflects the caller when a valid token is supplied, otherwise it is `false`.",
    params(("username" = String, Path, description = "Channel username (case-insensitive)")),
    responses(
        (status = 200, description = "Channel profile", body = ApiResponse<ChannelProfileResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Channel does not exist (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer))]
pub async fn channel_profile(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfileResponse>, AppError> {
    let channel = ProfileService::new(&state)
        .channel_profile(&username, viewer.map(|v| v.user_id))
        .await?;

    Ok(ApiResponse::ok(channel, "User channel fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "Users",
    operation_id = "getWatchHistory",
    summary = "Get watch history",
    description = "Videos the caller has opened, oldest first, each with its owner's public profile.",
    responses(
        (status = 200, description = "Watch history", body = ApiResponse<Vec<WatchedVideo>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn watch_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<WatchedVideo>>, AppError> {
    let history = ProfileService::new(&state).watch_history(auth_user.user_id).await?;
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
