use axum_typed_multipart::TryFromMultipart;
use chrono::{DateTime, Utc};
use sea_orm::Order;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{MediaResponse, non_blank, parse_id};
use super::user::OwnerProfile;
use crate::entity::{user, video};
use crate::error::AppError;
use crate::extractors::multipart::TempUpload;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose row offset still fits a Postgres `bigint`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// Multipart body for publishing a video.
#[derive(TryFromMultipart)]
pub struct PublishVideoForm {
    pub title: Option<String>,
    pub description: Option<String>,
    #[form_data(field_name = "videoFile", limit = "unlimited")]
    pub video_file: Option<TempUpload>,
    #[form_data(limit = "unlimited")]
    pub thumbnail: Option<TempUpload>,
}

/// Multipart body for editing a video's metadata.
#[derive(TryFromMultipart)]
pub struct UpdateVideoForm {
    pub title: Option<String>,
    pub description: Option<String>,
    #[form_data(limit = "unlimited")]
    pub thumbnail: Option<TempUpload>,
}

/// Title and description after trimming; at least one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoText {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn validate_video_text(title: Option<&str>, description: Option<&str>) -> Result<VideoText, AppError> {
    let title = non_blank(title).map(str::to_string);
    let description = non_blank(description).map(str::to_string);
    if title.is_none() && description.is_none() {
        return Err(AppError::Validation(
            "Title or description is required".into(),
        ));
    }
    Ok(VideoText { title, description })
}

/// Check the text fields, then that both files are present. Runs before any upload.
pub fn validate_publish_form(
    form: &PublishVideoForm,
) -> Result<(VideoText, &TempUpload, &TempUpload), AppError> {
    let text = validate_video_text(form.title.as_deref(), form.description.as_deref())?;
    match (form.video_file.as_ref(), form.thumbnail.as_ref()) {
        (Some(video_file), Some(thumbnail)) => Ok((text, video_file, thumbnail)),
        _ => Err(AppError::Validation(
            "Video file and thumbnail are required".into(),
        )),
    }
}

/// Raw query string of the listing endpoint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VideoListQuery {
    /// Page number (1-based, default 1).
    pub page: Option<String>,
    /// Page size (default 10, clamped to 1-100).
    pub limit: Option<String>,
    /// Case-insensitive substring matched against title and description.
    pub query: Option<String>,
    /// One of `createdAt`, `updatedAt`, `views`, `duration`, `title`.
    pub sort_by: Option<String>,
    /// `asc` for ascending; anything else sorts descending.
    pub sort_type: Option<String>,
    /// Restrict to videos owned by this user.
    pub user_id: Option<String>,
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "views" => Some(Self::Views),
            "duration" => Some(Self::Duration),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn column(self) -> video::Column {
        match self {
            Self::CreatedAt => video::Column::CreatedAt,
            Self::UpdatedAt => video::Column::UpdatedAt,
            Self::Views => video::Column::Views,
            Self::Duration => video::Column::Duration,
            Self::Title => video::Column::Title,
        }
    }
}

/// Validated listing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoListParams {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    pub sort: (SortField, Order),
}

impl VideoListParams {
    /// Rows skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_number(raw: Option<&str>, name: &str) -> Result<Option<u64>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(|n| Some(n.max(0) as u64))
            .map_err(|_| AppError::Validation(format!("{name} must be a number"))),
    }
}

impl VideoListQuery {
    pub fn into_params(self) -> Result<VideoListParams, AppError> {
        let page = parse_number(self.page.as_deref(), "page")?
            .unwrap_or(1)
            .clamp(1, MAX_PAGE);
        let limit = parse_number(self.limit.as_deref(), "limit")?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let owner_id = non_blank(self.user_id.as_deref())
            .map(|raw| parse_id(raw, "userId"))
            .transpose()?;

        let sort = match (
            non_blank(self.sort_by.as_deref()),
            non_blank(self.sort_type.as_deref()),
        ) {
            (Some(by), Some(kind)) => {
                let field = SortField::parse(by)
                    .ok_or_else(|| AppError::Validation(format!("Cannot sort by '{by}'")))?;
                let order = if kind.eq_ignore_ascii_case("asc") {
                    Order::Asc
                } else {
                    Order::Desc
                };
                (field, order)
            }
            _ => (SortField::CreatedAt, Order::Desc),
        };

        Ok(VideoListParams {
            page,
            limit,
            search: non_blank(self.query.as_deref()).map(str::to_string),
            owner_id,
            sort,
        })
    }
}

/// Video columns shared by every response shape; the owner is added by the wrapper.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoFields {
    pub id: Uuid,
    pub video_file: MediaResponse,
    pub thumbnail: MediaResponse,
    #[schema(example = "Intro to ownership")]
    pub title: String,
    pub description: String,
    /// Seconds.
    #[schema(example = 12.5)]
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<video::Model> for VideoFields {
    fn from(v: video::Model) -> Self {
        Self {
            id: v.id,
            video_file: MediaResponse::new(v.video_file_url, v.video_file_storage_id),
            thumbnail: MediaResponse::new(v.thumbnail_url, v.thumbnail_storage_id),
            title: v.title,
            description: v.description,
            duration: v.duration,
            views: v.views,
            is_published: v.is_published,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// A video as returned to its owner, with `owner` as a bare id.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    #[serde(flatten)]
    pub video: VideoFields,
    pub owner: Uuid,
}

impl From<video::Model> for VideoResponse {
    fn from(v: video::Model) -> Self {
        let owner = v.owner_id;
        Self {
            video: v.into(),
            owner,
        }
    }
}

/// Owner fields inlined into listing entries.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    /// Avatar URL.
    pub avatar: String,
}

impl From<user::Model> for OwnerSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar_url,
        }
    }
}

/// Listing entry: a video with its owner's public fields inlined.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListedVideo {
    #[serde(flatten)]
    pub video: VideoFields,
    pub owner: OwnerSummary,
}

impl ListedVideo {
    pub fn new(video: video::Model, owner: user::Model) -> Self {
        Self {
            video: video.into(),
            owner: owner.into(),
        }
    }
}

/// Watch-history entry. `owner` is `null` if the uploader no longer exists.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WatchedVideo {
    #[serde(flatten)]
    pub video: VideoFields,
    pub owner: Option<OwnerProfile>,
}

impl WatchedVideo {
    pub fn new(video: video::Model, owner: Option<user::Model>) -> Self {
        Self {
            video: video.into(),
            owner: owner.map(OwnerProfile::from),
        }
    }
}

/// One page of the video listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub docs: Vec<ListedVideo>,
    #[schema(example = 47)]
    pub total_docs: u64,
    #[schema(example = 10)]
    pub limit: u64,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 5)]
    pub total_pages: u64,
    /// 1-based index of the first document on this page.
    #[schema(example = 1)]
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl VideoPage {
    pub fn new(docs: Vec<ListedVideo>, total_docs: u64, page: u64, limit: u64) -> Self {
        let total_pages = total_docs.div_ceil(limit).max(1);
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;
        Self {
            docs,
            total_docs,
            limit,
            page,
            total_pages,
            paging_counter: (page - 1).saturating_mul(limit).saturating_add(1),
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page.saturating_add(1)),
        }
    }
}
