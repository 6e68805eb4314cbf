use axum::extract::State;
use serde::Serialize;

use crate::error::{AppError, ErrorBody};
use crate::models::shared::ApiResponse;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    #[schema(example = "OK")]
    pub status: &'static str,
}

/// Liveness probe. Also pings the database.
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "Health",
    operation_id = "healthcheck",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthStatus>),
        (status = 500, description = "Database unreachable (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
pub async fn healthcheck(State(state): State<AppState>) -> Result<ApiResponse<HealthStatus>, AppError> {
    state.db.ping().await?;
    Ok(ApiResponse::ok(HealthStatus { status: "OK" }, "Health check passed"))
}
