use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};

use crate::domains::provisioning::{
    bootstrap_admin, cleanup_users, create_user, BootstrapResponse, CleanupResponse,
    CreateUserResponse, UserCreationRequest,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// POST /create-user
pub async fn create_user_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<UserCreationRequest>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let Json(request) = body?;
    let created = create_user(request, &state.deps).await?;
    Ok(Json(created.into()))
}

/// POST /cleanup-users
///
/// Deletes every identity except the administrator. Per-user failures are
/// reported in `results` and do not fail the request.
pub async fn cleanup_users_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let report = cleanup_users(&state.deps).await?;
    Ok(Json(report.into()))
}

/// POST /create-admin-user
pub async fn create_admin_user_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<BootstrapResponse>, ApiError> {
    let report = bootstrap_admin(&state.deps).await?;
    Ok(Json(report.into()))
}
