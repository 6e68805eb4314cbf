use chrono::Utc;
use common::{MediaKind, MediaRelay, MediaUpload};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{discard_asset, upload_asset};
use crate::entity::{user, video, watch_history};
use crate::error::AppError;
use crate::models::shared::escape_like;
use crate::models::video::{ListedVideo, VideoListParams, VideoPage, VideoText};
use crate::state::AppState;

/// Video publishing, listing and per-video operations.
pub struct ContentService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaRelay,
}

impl<'a> ContentService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            media: state.media.as_ref(),
        }
    }

    /// Upload the video and its thumbnail, then record them under `owner_id`.
    #[instrument(skip(self, text, video_file, thumbnail))]
    pub async fn publish(
        &self,
        owner_id: Uuid,
        text: VideoText,
        video_file: MediaUpload<'_>,
        thumbnail: MediaUpload<'_>,
    ) -> Result<video::Model, AppError> {
        let (video_asset, duration) =
            upload_asset(self.media, video_file, "Video upload failed").await?;
        let (thumb_asset, _) =
            upload_asset(self.media, thumbnail, "Thumbnail upload failed").await?;

        let now = Utc::now();
        let id = Uuid::now_v7();
        let model = video::ActiveModel {
            id: Set(id),
            video_file_url: Set(video_asset.url),
            video_file_storage_id: Set(video_asset.storage_id),
            thumbnail_url: Set(thumb_asset.url),
            thumbnail_storage_id: Set(thumb_asset.storage_id),
            title: Set(text.title.unwrap_or_default()),
            description: Set(text.description.unwrap_or_default()),
            duration: Set(duration.unwrap_or(0.0)),
            views: Set(0),
            is_published: Set(true),
            owner_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(self.db).await?;

        let video = video::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Video {id} missing right after insert")))?;

        info!(video_id = %video.id, "Video published");
        Ok(video)
    }

    /// One page of published videos, optionally searched and filtered by owner.
    #[instrument(skip(self))]
    pub async fn list(&self, params: VideoListParams) -> Result<VideoPage, AppError> {
        let mut select = video::Entity::find();

        if let Some(search) = &params.search {
            let pattern = format!("%{}%", escape_like(search).to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((video::Entity, video::Column::Title))))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            video::Entity,
                            video::Column::Description,
                        ))))
                        .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
        if let Some(owner_id) = params.owner_id {
            select = select.filter(video::Column::OwnerId.eq(owner_id));
        }
        select = select.filter(video::Column::IsPublished.eq(true));

        let total = select.clone().count(self.db).await?;

        let (field, order) = params.sort.clone();
        let rows = select
            .find_also_related(user::Entity)
            .order_by(field.column(), order)
            .order_by_desc(video::Column::Id)
            .offset(Some(params.offset()))
            .limit(Some(params.limit))
            .all(self.db)
            .await?;

        let docs = rows
            .into_iter()
            .filter_map(|(video, owner)| owner.map(|owner| ListedVideo::new(video, owner)))
            .collect();

        Ok(VideoPage::new(docs, total, params.page, params.limit))
    }

    /// Fetch a video for `viewer`, counting the view and recording it in the
    /// viewer's watch history. Unpublished videos are visible to their owner only.
    #[instrument(skip(self))]
    pub async fn watch(
        &self,
        video_id: Uuid,
        viewer: Uuid,
    ) -> Result<(video::Model, Option<user::Model>), AppError> {
        let (mut video, owner) = video::Entity::find_by_id(video_id)
            .find_also_related(user::Entity)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".into()))?;

        if !video.is_published && video.owner_id != viewer {
            return Err(AppError::NotFound("Video not found".into()));
        }

        video::Entity::update_many()
            .col_expr(video::Column::Views, Expr::col(video::Column::Views).add(1))
            .filter(video::Column::Id.eq(video_id))
            .exec(self.db)
            .await?;
        video.views += 1;

        self.record_view(viewer, video_id).await?;

        Ok((video, owner))
    }

    async fn record_view(&self, user_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        let seen = watch_history::Entity::find_by_id((user_id, video_id))
            .one(self.db)
            .await?;
        if seen.is_some() {
            return Ok(());
        }

        let entry = watch_history::ActiveModel {
            user_id: Set(user_id),
            video_id: Set(video_id),
            watched_at: Set(Utc::now()),
        };
        match entry.insert(self.db).await {
            Ok(_) => Ok(()),
            // A concurrent request for the same video got there first.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Edit title/description and optionally replace the thumbnail.
    #[instrument(skip(self, text, thumbnail))]
    pub async fn update(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        text: VideoText,
        thumbnail: Option<MediaUpload<'_>>,
    ) -> Result<video::Model, AppError> {
        let video = self.owned_video(video_id, user_id).await?;
        let old_thumbnail = video.thumbnail_storage_id.clone();

        let mut active: video::ActiveModel = video.into();
        if let Some(title) = text.title {
            active.title = Set(title);
        }
        if let Some(description) = text.description {
            active.description = Set(description);
        }

        let replaced = match thumbnail {
            Some(upload) => {
                let (asset, _) =
                    upload_asset(self.media, upload, "Thumbnail upload failed").await?;
                active.thumbnail_url = Set(asset.url);
                active.thumbnail_storage_id = Set(asset.storage_id);
                true
            }
            None => false,
        };
        active.updated_at = Set(Utc::now());

        let video = active.update(self.db).await?;
        if replaced {
            discard_asset(self.media, &old_thumbnail, MediaKind::Image).await;
        }

        info!("Video updated");
        Ok(video)
    }

    #[instrument(skip(self))]
    pub async fn toggle_publish(&self, video_id: Uuid, user_id: Uuid) -> Result<video::Model, AppError> {
        let video = self.owned_video(video_id, user_id).await?;
        let published = !video.is_published;

        let mut active: video::ActiveModel = video.into();
        active.is_published = Set(published);
        active.updated_at = Set(Utc::now());
        let video = active.update(self.db).await?;

        info!(is_published = published, "Publish status toggled");
        Ok(video)
    }

    async fn owned_video(&self, video_id: Uuid, user_id: Uuid) -> Result<video::Model, AppError> {
        let video = video::Entity::find_by_id(video_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".into()))?;
        if video.owner_id != user_id {
            return Err(AppError::PermissionDenied);
        }
        Ok(video)
    }
}
