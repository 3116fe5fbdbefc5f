//! Auth endpoints and the bearer-token middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::{
    AuthResponse, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, StatusResponse,
};
use crate::services::token::TokenError;
use crate::AppState;

/// Refresh token a client may present alongside an expired access token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
/// Replacement credentials handed back after a mid-request renewal.
pub const NEW_ACCESS_TOKEN_HEADER: &str = "x-new-access-token";
pub const NEW_REFRESH_TOKEN_HEADER: &str = "x-new-refresh-token";

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state.auth.login(&payload).await?;
    Ok(Json(response))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(response))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Json<StatusResponse>> {
    state.auth.logout(&payload.refresh_token).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Auth middleware - validates the Bearer access token. When the token
/// is expired (signature still valid) and the client also sent a
/// refresh token, the pair is rotated in place and the replacements are
/// returned in response headers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("invalid Authorization format".to_string()))?
        .to_string();

    match state.auth.verify_access_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.user_id,
                email: claims.email,
                role: claims.role,
            });
            Ok(next.run(request).await)
        }
        Err(TokenError::Expired) => {
            let refresh_token = request
                .headers()
                .get(REFRESH_TOKEN_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| ApiError::Unauthorized("access token expired".to_string()))?;

            let renewed = state.auth.refresh(&refresh_token).await?;
            tracing::debug!(user_id = renewed.user.id, "renewed expired access token");

            request.extensions_mut().insert(AuthenticatedUser {
                user_id: renewed.user.id,
                email: renewed.user.email.clone(),
                role: renewed.user.role.clone(),
            });

            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                NEW_ACCESS_TOKEN_HEADER,
                header_value(&renewed.access_token)?,
            );
            headers.insert(
                NEW_REFRESH_TOKEN_HEADER,
                header_value(&renewed.refresh_token)?,
            );
            Ok(response)
        }
        Err(TokenError::Invalid) => {
            Err(ApiError::Unauthorized("invalid access token".to_string()))
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::Internal("token is not header-safe".to_string()))
}
