//! Profile and progression endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{ProgressRequest, StatisticsResponse, UserProfileResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/user/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfileResponse>> {
    let response = state.users.profile(auth.user_id).await?;
    Ok(Json(response))
}

/// POST /api/user/progress
pub async fn progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<StatisticsResponse>> {
    let statistics = state.users.apply_progress(auth.user_id, &payload).await?;
    Ok(Json(StatisticsResponse { statistics }))
}
