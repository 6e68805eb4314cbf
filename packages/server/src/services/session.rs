use chrono::Utc;
use common::{MediaRelay, MediaUpload};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::upload_asset;
use crate::config::AuthConfig;
use crate::entity::user;
use crate::error::AppError;
use crate::models::user::{Credentials, NewUser};
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::jwt::{self, TokenPair};

/// Registration, login and token lifecycle.
pub struct SessionService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaRelay,
    auth: &'a AuthConfig,
}

impl<'a> SessionService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            media: state.media.as_ref(),
            auth: &state.config.auth,
        }
    }

    /// Create an account. The avatar is mandatory; a failed cover upload is
    /// tolerated and leaves the account without a cover image.
    #[instrument(skip_all, fields(username = %new_user.username))]
    pub async fn register(
        &self,
        new_user: NewUser,
        avatar: MediaUpload<'_>,
        cover_image: Option<MediaUpload<'_>>,
    ) -> Result<user::Model, AppError> {
        let existing = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(&new_user.username))
                    .add(user::Column::Email.eq(&new_user.email)),
            )
            .one(self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "User with email or username already exists".into(),
            ));
        }

        let (avatar, _) = upload_asset(self.media, avatar, "Avatar upload failed").await?;

        let cover = match cover_image {
            Some(upload) => match upload_asset(self.media, upload, "Cover image upload failed").await {
                Ok((asset, _)) => Some(asset),
                Err(e) => {
                    warn!("Continuing registration without cover image: {:?}", e);
                    None
                }
            },
            None => None,
        };

        let password = hash::hash_password_async(new_user.password)
            .await
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            full_name: Set(new_user.full_name),
            password: Set(password),
            avatar_url: Set(avatar.url),
            avatar_storage_id: Set(avatar.storage_id),
            cover_image_url: Set(cover.as_ref().map(|c| c.url.clone())),
            cover_image_storage_id: Set(cover.map(|c| c.storage_id)),
            refresh_token: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = model.insert(self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                AppError::Conflict("User with email or username already exists".into())
            }
            _ => AppError::from(e),
        })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and start a new session, replacing any previous one.
    #[instrument(skip_all, fields(username = ?credentials.username, email = ?credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<(user::Model, TokenPair), AppError> {
        let mut lookup = Condition::any();
        if let Some(username) = &credentials.username {
            lookup = lookup.add(user::Column::Username.eq(username));
        }
        if let Some(email) = &credentials.email {
            lookup = lookup.add(user::Column::Email.eq(email));
        }

        let user = user::Entity::find()
            .filter(lookup)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

        let is_valid = hash::verify_password_async(credentials.password, user.password.clone())
            .await
            .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.sign(&user)?;
        let user = self.store_refresh_token(user, &tokens.refresh_token).await?;

        info!(user_id = %user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Forget the stored refresh token so it can no longer be rotated.
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, Expr::value(Option::<String>::None))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        info!("User logged out");
        Ok(())
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// The swap is a compare-and-set on the stored token, so of two concurrent
    /// refreshes with the same token only one succeeds.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: Option<String>) -> Result<TokenPair, AppError> {
        let incoming = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenMissing)?;

        let claims = jwt::verify_refresh(&incoming, self.auth).map_err(|e| {
            tracing::debug!("Rejected refresh token: {}", e);
            AppError::TokenInvalid
        })?;

        let user = user::Entity::find_by_id(claims.sub)
            .one(self.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if user.refresh_token.as_deref() != Some(incoming.as_str()) {
            warn!(user_id = %user.id, "Refresh token reuse detected");
            return Err(AppError::TokenReused);
        }

        let tokens = self.sign(&user)?;
        let swapped = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, Expr::value(Some(tokens.refresh_token.clone())))
            .filter(user::Column::Id.eq(user.id))
            .filter(user::Column::RefreshToken.eq(incoming))
            .exec(self.db)
            .await?;

        if swapped.rows_affected == 0 {
            warn!(user_id = %user.id, "Refresh token rotated concurrently");
            return Err(AppError::TokenReused);
        }

        info!(user_id = %user.id, "Session refreshed");
        Ok(tokens)
    }

    /// Replace the password after checking the old one.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: String,
        new_password: String,
    ) -> Result<(), AppError> {
        let user = user::Entity::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let is_valid = hash::verify_password_async(old_password, user.password.clone())
            .await
            .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
        if !is_valid {
            return Err(AppError::Validation("Invalid old password".into()));
        }

        let hashed = hash::hash_password_async(new_password)
            .await
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let mut active: user::ActiveModel = user.into();
        active.password = Set(hashed);
        active.updated_at = Set(Utc::now());
        active.update(self.db).await?;

        info!("Password changed");
        Ok(())
    }

    fn sign(&self, user: &user::Model) -> Result<TokenPair, AppError> {
        jwt::sign_pair(user, self.auth)
            .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
    }

    async fn store_refresh_token(&self, user: user::Model, token: &str) -> Result<user::Model, AppError> {
        let mut active: user::ActiveModel = user.into();
        active.refresh_token = Set(Some(token.to_string()));
        Ok(active.update(self.db).await?)
    }
}

