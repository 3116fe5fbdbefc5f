//! Access token signing and verification (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Validity window of an access token.
pub fn access_token_ttl() -> Duration {
    Duration::hours(24)
}

/// Validity window of a refresh token.
pub fn refresh_token_ttl() -> Duration {
    Duration::days(30)
}

/// Claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

/// Why verification failed. Expiry is separated so the auth middleware
/// can offer the refresh path only for expired tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Symmetric-key signer/verifier for access tokens.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign an access token for `user` valid for the standard window.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_validity(user, access_token_ttl())
    }

    /// Sign an access token with an explicit validity window. A negative
    /// window produces an already-expired token, which tests use to
    /// exercise the refresh path.
    pub fn issue_with_validity(
        &self,
        user: &User,
        validity: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            exp: (now + validity).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
