use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::config::AuthConfig;
use crate::utils::jwt::TokenPair;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    config: &AuthConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config.cookie_secure)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Add both session cookies for a freshly issued token pair.
pub fn with_session(jar: CookieJar, tokens: &TokenPair, config: &AuthConfig) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        tokens.access_token.clone(),
        config.access_token_ttl_secs,
        config,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        tokens.refresh_token.clone(),
        config.refresh_token_ttl_secs,
        config,
    ))
}

fn expired_cookie(name: &'static str, config: &AuthConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), 0, config);
    cookie.make_removal();
    cookie
}

/// Expire both session cookies.
///
/// The expiring cookies are always sent, even when the request authenticated
/// with a bearer header and carried no cookies.
pub fn without_session(jar: CookieJar, config: &AuthConfig) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, config))
        .add(expired_cookie(REFRESH_COOKIE, config))
}
