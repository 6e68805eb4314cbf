use axum::extract::{Path, State};
use common::MediaKind;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppQuery;
use crate::extractors::multipart::{AppMultipart, media_upload};
use crate::models::shared::{ApiResponse, parse_id};
use crate::models::video::{
    PublishVideoForm, UpdateVideoForm, VideoListQuery, VideoPage, VideoResponse, WatchedVideo,
    validate_publish_form, validate_video_text,
};
use crate::services::content::ContentService;
use crate::state::AppState;

/// List published videos.
#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "getAllVideos",
    summary = "List videos",
    description = "Paginated list of published videos. `query` matches title or description \
        case-insensitively. Sorting by `sortBy` applies only when `sortType` is also given; \
        the default order is newest first.",
    params(VideoListQuery),
    responses(
        (status = 200, description = "One page of videos", body = ApiResponse<VideoPage>),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_videos(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VideoListQuery>,
) -> Result<ApiResponse<VideoPage>, AppError> {
    let params = query.into_params()?;
    let page = ContentService::new(&state).list(params).await?;
    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

/// Upload and publish a new video.
#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "publishVideo",
    summary = "Publish a video",
    description = "`videoFile` and `thumbnail` are required; at least one of `title` or \
        `description` must be non-blank.",
    request_body(content_type = "multipart/form-data", description = "title, description, videoFile, thumbnail"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn publish_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppMultipart(form): AppMultipart<PublishVideoForm>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let (text, video_file, thumbnail) = validate_publish_form(&form)?;

    let video = ContentService::new(&state)
        .publish(
            auth_user.user_id,
            text,
            media_upload(video_file, MediaKind::Video),
            media_upload(thumbnail, MediaKind::Image),
        )
        .await?;

    Ok(ApiResponse::created(video.into(), "Video uploaded successfully"))
}

/// Watch a video.
#[utoipa::path(
    get,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "getVideoById",
    summary = "Get a video",
    description = "Returns the video with its owner, increments its view count and adds it \
        to the caller's watch history. Unpublished videos are only visible to their owner.",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = ApiResponse<WatchedVideo>),
        (status = 400, description = "Malformed id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<WatchedVideo>, AppError> {
    let video_id = parse_id(&video_id, "video id")?;

    let (video, owner) = ContentService::new(&state)
        .watch(video_id, auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(
        WatchedVideo::new(video, owner),
        "Video fetched successfully",
    ))
}

/// Edit a video's metadata.
#[utoipa::path(
    patch,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Owner only. Updates `title`/`description` (at least one non-blank) and \
        optionally replaces the `thumbnail`.",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "title, description, thumbnail"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    AppMultipart(form): AppMultipart<UpdateVideoForm>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let video_id = parse_id(&video_id, "video id")?;
    let text = validate_video_text(form.title.as_deref(), form.description.as_deref())?;

    let video = ContentService::new(&state)
        .update(
            video_id,
            auth_user.user_id,
            text,
            form.thumbnail
                .as_ref()
                .map(|f| media_upload(f, MediaKind::Image)),
        )
        .await?;

    Ok(ApiResponse::ok(video.into(), "Video updated successfully"))
}

/// `PUT` form of [`update_video`], kept for clients of the older route.
#[utoipa::path(
    put,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "replaceVideo",
    summary = "Update a video",
    description = "Same as `PATCH /videos/{videoId}`.",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "title, description, thumbnail"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UPLOAD_FAILED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn replace_video(
    auth_user: AuthUser,
    state: State<AppState>,
    video_id: Path<String>,
    form: AppMultipart<UpdateVideoForm>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    update_video(auth_user, state, video_id, form).await
}

#[utoipa::path(
    patch,
    path = "/toggle/publish/{videoId}",
    tag = "Videos",
    operation_id = "togglePublishStatus",
    summary = "Toggle publish status",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Publish status flipped", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Malformed id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn toggle_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let video_id = parse_id(&video_id, "video id")?;

    let video = ContentService::new(&state)
        .toggle_publish(video_id, auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(video.into(), "Publish status toggled"))
}
