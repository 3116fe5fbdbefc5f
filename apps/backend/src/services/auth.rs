//! Session and token management: register, login, refresh rotation,
//! logout.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{AuthResponse, LoginRequest, RefreshToken, RegisterRequest, User};
use crate::services::token::{refresh_token_ttl, Claims, TokenError, TokenSigner};

/// Login failures never reveal whether the email exists.
const BAD_CREDENTIALS: &str = "invalid email or password";

/// Storage capabilities the session manager needs.
#[allow(async_fn_in_trait)]
pub trait AuthStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    /// Insert a user; `Conflict` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str, role: &str) -> Result<User>;
    /// Insert the zero-initialized statistics row for a new user.
    async fn create_statistics(&self, user_id: i64) -> Result<()>;
    /// Insert or replace the refresh token for `user_id`.
    async fn upsert_refresh_token(&self, rt: &RefreshToken) -> Result<()>;
    /// Atomically remove and return the token row, if present. A token
    /// can be consumed at most once.
    async fn consume_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>>;
    /// Remove the token row; `false` if nothing matched.
    async fn delete_refresh_token(&self, token: &str) -> Result<bool>;
}

pub struct AuthService<S> {
    store: S,
    signer: TokenSigner,
}

impl<S: AuthStore> AuthService<S> {
    pub fn new(store: S, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        if req.email.is_empty() || !req.email.contains('@') {
            return Err(ApiError::BadRequest("invalid email".to_string()));
        }
        if req.password.len() < 6 {
            return Err(ApiError::BadRequest(
                "password must be at least 6 characters".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .create_user(&req.email, &password_hash, "user")
            .await?;
        self.store.create_statistics(user.id).await?;

        tracing::info!(user_id = user.id, "registered new user");

        self.issue_credential_pair(user).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let user = self
            .store
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(&req.password, &user.password_hash) {
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        self.issue_credential_pair(user).await
    }

    /// Full rotation: the presented token is consumed and can never be
    /// reused, success or not.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse> {
        let rt = self
            .store
            .consume_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid refresh token".to_string()))?;

        if rt.expires_at < Utc::now() {
            return Err(ApiError::Unauthorized("refresh token expired".to_string()));
        }

        let user = self
            .store
            .find_user_by_id(rt.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid refresh token".to_string()))?;

        self.issue_credential_pair(user).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        if !self.store.delete_refresh_token(refresh_token).await? {
            return Err(ApiError::Unauthorized("unknown refresh token".to_string()));
        }
        Ok(())
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.signer.verify(token)
    }

    /// Sign a fresh access token and persist a fresh refresh token,
    /// replacing any prior one for this user.
    async fn issue_credential_pair(&self, user: User) -> Result<AuthResponse> {
        let access_token = self
            .signer
            .issue(&user)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

        let refresh_token = Uuid::new_v4().to_string();
        let rt = RefreshToken {
            id: 0,
            user_id: user.id,
            token: refresh_token.clone(),
            expires_at: Utc::now() + refresh_token_ttl(),
        };
        self.store.upsert_refresh_token(&rt).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user,
        })
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
