//! Common test utilities and fixtures for integration tests.
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).
//! JWT_SECRET defaults to a test value when unset.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;

use engkids_backend::db::Database;
use engkids_backend::models::{AuthResponse, RegisterRequest};
use engkids_backend::services::token::TokenSigner;
use engkids_backend::{build_router, AppState};

const TEST_PASSWORD: &str = "password123";

/// Test context containing database connection and the app router.
///
/// Requires DATABASE_URL to be set; panics otherwise.
pub struct TestContext {
    pub db: Arc<Database>,
    pub state: AppState,
    jwt_secret: String,
    app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "integration-test-secret".to_string());

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations().await.expect("Failed to run migrations");

        let state = AppState::new(db, TokenSigner::new(jwt_secret.as_bytes()));
        let app = build_router(state.clone());

        Self {
            db: state.db.clone(),
            state,
            jwt_secret,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// A signer sharing the app's secret, for minting tokens directly.
    pub fn signer(&self) -> TokenSigner {
        TokenSigner::new(self.jwt_secret.as_bytes())
    }

    /// Register a fresh user and return the issued credentials.
    pub async fn register_user(&self, email: &str) -> AuthResponse {
        self.state
            .auth
            .register(&RegisterRequest {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await
            .expect("Failed to register test user")
    }

    pub fn test_password() -> &'static str {
        TEST_PASSWORD
    }

    /// Insert a catalog item and return its id.
    pub async fn create_test_item(&self, name: &str, category: &str, price: i32) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO items (name, item_type, category, rarity, price, image_url, description)
            VALUES ($1, 'cosmetic', $2, 'common', $3, '', '')
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(price)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create test item")
    }

    /// Insert a vocabulary word and return its id.
    pub async fn create_test_word(&self, english: &str, translation: &str) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO words (english_word, translation, difficulty, category)
            VALUES ($1, $2, 1, 'test')
            RETURNING id
            "#,
        )
        .bind(english)
        .bind(translation)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create test word")
    }

    /// Set a user's coin balance directly.
    pub async fn set_coins(&self, user_id: i64, coins: i32) {
        sqlx::query("UPDATE user_statistics SET coins = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(coins)
            .execute(self.db.pool())
            .await
            .expect("Failed to set coins");
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    pub async fn cleanup_user(&self, user_id: i64) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM user_words WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM inventory_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM user_statistics WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }

    pub async fn cleanup_item(&self, item_id: i64) {
        let _ = sqlx::query("DELETE FROM inventory_items WHERE item_id = $1")
            .bind(item_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item_id)
            .execute(self.db.pool())
            .await;
    }

    pub async fn cleanup_word(&self, word_id: i64) {
        let _ = sqlx::query("DELETE FROM user_words WHERE word_id = $1")
            .bind(word_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(word_id)
            .execute(self.db.pool())
            .await;
    }
}
