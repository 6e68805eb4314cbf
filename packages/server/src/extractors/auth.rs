use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::ACCESS_COOKIE;
use crate::utils::jwt::{self, AccessClaims};

/// Authenticated user extracted from the access token.
///
/// The token is read from `Authorization: Bearer <token>`, falling back to the
/// `accessToken` cookie. Add this as a handler parameter to require
/// authentication, or take `Option<AuthUser>` on public routes that only
/// personalise their output.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl From<AccessClaims> for AuthUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            email: claims.email,
            full_name: claims.full_name,
        }
    }
}

/// Locate the raw access token. A malformed `Authorization` header counts as
/// "present but invalid" rather than falling back to the cookie.
fn access_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenInvalid)?;
        return Ok(Some(token.to_string()));
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(parts)?.ok_or(AppError::TokenMissing)?;

        let claims = jwt::verify_access(&token, &state.config.auth).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            AppError::TokenInvalid
        })?;

        Ok(claims.into())
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let user = access_token(parts)
            .ok()
            .flatten()
            .and_then(|token| jwt::verify_access(&token, &state.config.auth).ok())
            .map(AuthUser::from);
        Ok(user)
    }
}
