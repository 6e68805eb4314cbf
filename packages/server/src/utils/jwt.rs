use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::user;

/// Claims carried by the short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: Uuid, // User ID
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the long-lived refresh token: the user id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid, // User ID
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T> {
    let token_data = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Sign a new access token for a user.
pub fn sign_access(user: &user::Model, config: &AuthConfig) -> Result<String> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        jti: Uuid::new_v4(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(config.access_token_ttl_secs)).timestamp(),
    };
    sign(&claims, &config.access_token_secret)
}

/// Sign a new refresh token for a user.
pub fn sign_refresh(user_id: Uuid, config: &AuthConfig) -> Result<String> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user_id,
        jti: Uuid::new_v4(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(config.refresh_token_ttl_secs)).timestamp(),
    };
    sign(&claims, &config.refresh_token_secret)
}

/// Sign both tokens for a user.
pub fn sign_pair(user: &user::Model, config: &AuthConfig) -> Result<TokenPair> {
    Ok(TokenPair {
        access_token: sign_access(user, config)?,
        refresh_token: sign_refresh(user.id, config)?,
    })
}

/// Verify and decode an access token.
pub fn verify_access(token: &str, config: &AuthConfig) -> Result<AccessClaims> {
    verify(token, &config.access_token_secret)
}

/// Verify and decode a refresh token.
pub fn verify_refresh(token: &str, config: &AuthConfig) -> Result<RefreshClaims> {
    verify(token, &config.refresh_token_secret)
}
