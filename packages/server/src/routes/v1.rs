use axum::extract::DefaultBodyLimit;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload_limit = DefaultBodyLimit::max(config.upload.max_body_size);

    OpenApiRouter::new()
        .routes(routes!(handlers::health::healthcheck))
        .nest("/users", user_routes(upload_limit))
        .nest("/videos", video_routes(upload_limit))
}

fn user_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let json = OpenApiRouter::new()
        .routes(routes!(handlers::users::login))
        .routes(routes!(handlers::users::logout))
        .routes(routes!(handlers::users::refresh_token))
        .routes(routes!(handlers::users::change_password))
        .routes(routes!(handlers::users::current_user))
        .routes(routes!(handlers::users::update_account))
        .routes(routes!(handlers::users::channel_profile))
        .routes(routes!(handlers::users::watch_history));

    let uploads = OpenApiRouter::new()
        .routes(routes!(handlers::users::register))
        .routes(routes!(handlers::users::update_avatar))
        .routes(routes!(handlers::users::update_cover_image))
        .layer(upload_limit);

    json.merge(uploads)
}

fn video_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    // Handlers sharing a path are registered together.
    OpenApiRouter::new()
        .routes(routes!(
            handlers::videos::list_videos,
            handlers::videos::publish_video
        ))
        .routes(routes!(
            handlers::videos::get_video,
            handlers::videos::update_video,
            handlers::videos::replace_video
        ))
        .routes(routes!(handlers::videos::toggle_publish))
        .layer(upload_limit)
}
