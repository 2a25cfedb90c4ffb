//! Caller account handlers.

use axum::Json;
use axum::extract::State;

use cloudvault_service::user::UserStats;

use crate::dto::response::ProfileResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.user_service.profile(&auth).await?;
    Ok(Json(ProfileResponse::from(user)))
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.user_service.stats(&auth).await?))
}
