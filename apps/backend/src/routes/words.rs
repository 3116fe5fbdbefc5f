//! Vocabulary endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{LearnWordRequest, StatusResponse, WordsResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/user/words
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<WordsResponse>> {
    let words = state.users.user_words(auth.user_id).await?;
    Ok(Json(WordsResponse { words }))
}

/// POST /api/user/words/learn
pub async fn learn(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<LearnWordRequest>,
) -> Result<Json<StatusResponse>> {
    state.users.learn_word(auth.user_id, &payload).await?;
    Ok(Json(StatusResponse::ok()))
}
