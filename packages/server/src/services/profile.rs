use std::collections::HashMap;

use chrono::Utc;
use common::{MediaKind, MediaRelay, MediaUpload};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{discard_asset, upload_asset};
use crate::entity::{subscription, user, video, watch_history};
use crate::error::AppError;
use crate::models::user::ChannelProfileResponse;
use crate::models::video::WatchedVideo;
use crate::state::AppState;

/// Which profile image an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Avatar,
    CoverImage,
}

impl ProfileImage {
    fn label(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::CoverImage => "cover image",
        }
    }
}

/// Account reads and updates, plus the channel and history read models.
pub struct ProfileService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaRelay,
}

impl<'a> ProfileService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            media: state.media.as_ref(),
        }
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    #[instrument(skip(self, full_name, email))]
    pub async fn update_account(
        &self,
        user_id: Uuid,
        full_name: String,
        email: String,
    ) -> Result<user::Model, AppError> {
        let user = self.current_user(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.full_name = Set(full_name);
        active.email = Set(email);
        active.updated_at = Set(Utc::now());

        let user = active.update(self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Email is already in use".into())
            }
            _ => AppError::from(e),
        })?;

        info!("Account details updated");
        Ok(user)
    }

    /// Swap the avatar or cover image. The previous asset is deleted first and
    /// a failed delete only logs a warning.
    #[instrument(skip(self, upload))]
    pub async fn update_image(
        &self,
        user_id: Uuid,
        which: ProfileImage,
        upload: MediaUpload<'_>,
    ) -> Result<user::Model, AppError> {
        let user = self.current_user(user_id).await?;

        let previous = match which {
            ProfileImage::Avatar => Some(user.avatar_storage_id.as_str()),
            ProfileImage::CoverImage => user.cover_image_storage_id.as_deref(),
        };
        if let Some(storage_id) = previous.filter(|id| !id.is_empty()) {
            discard_asset(self.media, storage_id, MediaKind::Image).await;
        }

        let failure = format!("Error while uploading {}", which.label());
        let (asset, _) = upload_asset(self.media, upload, &failure).await?;

        let mut active: user::ActiveModel = user.into();
        match which {
            ProfileImage::Avatar => {
                active.avatar_url = Set(asset.url);
                active.avatar_storage_id = Set(asset.storage_id);
            }
            ProfileImage::CoverImage => {
                active.cover_image_url = Set(Some(asset.url));
                active.cover_image_storage_id = Set(Some(asset.storage_id));
            }
        }
        active.updated_at = Set(Utc::now());

        let user = active.update(self.db).await?;
        info!("Updated {}", which.label());
        Ok(user)
    }

    /// Public channel page: the user plus subscription counts, personalised
    /// with `is_subscribed` when a viewer is known.
    #[instrument(skip(self))]
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<ChannelProfileResponse, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".into()));
        }

        let channel = user::Entity::find()
            .filter(user::Column::Username.eq(username.to_lowercase()))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel does not exist".into()))?;

        let subscribers = subscription::Entity::find()
            .filter(subscription::Column::ChannelId.eq(channel.id))
            .count(self.db);
        let subscribed_to = subscription::Entity::find()
            .filter(subscription::Column::SubscriberId.eq(channel.id))
            .count(self.db);
        let viewer_edge = async {
            match viewer {
                Some(viewer_id) => subscription::Entity::find_by_id((viewer_id, channel.id))
                    .one(self.db)
                    .await
                    .map(|edge| edge.is_some()),
                None => Ok(false),
            }
        };

        let (subscriber_count, subscribed_channel_count, is_subscribed) =
            tokio::try_join!(subscribers, subscribed_to, viewer_edge)?;

        Ok(ChannelProfileResponse::new(
            channel,
            subscriber_count,
            subscribed_channel_count,
            is_subscribed,
        ))
    }

    /// Videos the user has opened, in first-watch order, each with its owner inlined.
    #[instrument(skip(self))]
    pub async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>, AppError> {
        self.current_user(user_id).await?;

        let videos: Vec<video::Model> = watch_history::Entity::find()
            .filter(watch_history::Column::UserId.eq(user_id))
            .order_by_asc(watch_history::Column::WatchedAt)
            .find_also_related(video::Entity)
            .all(self.db)
            .await?
            .into_iter()
            .filter_map(|(_, video)| video)
            .collect();

        let owner_ids: Vec<Uuid> = videos.iter().map(|v| v.owner_id).collect();
        let owners: HashMap<Uuid, user::Model> = if owner_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(owner_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };

        Ok(videos
            .into_iter()
            .map(|video| {
                let owner = owners.get(&video.owner_id).cloned();
                WatchedVideo::new(video, owner)
            })
            .collect())
    }
}
