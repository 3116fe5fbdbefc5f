//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, PgPool};

use engkids_core::{purchase, schedule};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::auth::AuthStore;
use crate::services::user::UserStore;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AuthStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, email: &str, password_hash: &str, role: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("email already registered".to_string())
            }
            _ => ApiError::Database(e),
        })?;

        Ok(user)
    }

    async fn create_statistics(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_statistics (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_refresh_token(&self, rt: &RefreshToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(rt.user_id)
        .bind(&rt.token)
        .bind(rt.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        // DELETE .. RETURNING makes the consume atomic; a second caller
        // presenting the same token sees nothing.
        let rt = sqlx::query_as::<_, RefreshToken>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1
            RETURNING id, user_id, token, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rt)
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl UserStore for Database {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        AuthStore::find_user_by_id(self, id).await
    }

    async fn get_statistics(&self, user_id: i64) -> Result<Option<UserStatistics>> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT user_id, level, experience, coins, words_learned,
                   lessons_completed, days_streak, last_active
            FROM user_statistics
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn insert_statistics(&self, stats: &UserStatistics) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_statistics
                (user_id, level, experience, coins, words_learned,
                 lessons_completed, days_streak, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(stats.user_id)
        .bind(stats.level)
        .bind(stats.experience)
        .bind(stats.coins)
        .bind(stats.words_learned)
        .bind(stats.lessons_completed)
        .bind(stats.days_streak)
        .bind(stats.last_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_statistics(&self, stats: &UserStatistics) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_statistics
            SET level = $2, experience = $3, coins = $4, words_learned = $5,
                lessons_completed = $6, days_streak = $7, last_active = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(stats.user_id)
        .bind(stats.level)
        .bind(stats.experience)
        .bind(stats.coins)
        .bind(stats.words_learned)
        .bind(stats.lessons_completed)
        .bind(stats.days_streak)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_last_active(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_statistics
            SET last_active = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_words_learned(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_statistics
            SET words_learned = words_learned + 1
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_item(&self, item_id: i64) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, category, rarity, price, image_url, description
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT inv.id, inv.is_equipped, inv.acquired_at,
                   i.id AS item_id, i.name, i.item_type, i.category,
                   i.rarity, i.price, i.image_url, i.description
            FROM inventory_items inv
            JOIN items i ON i.id = inv.item_id
            WHERE inv.user_id = $1
            ORDER BY inv.acquired_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_inventory_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, user_id, item_id, is_equipped, acquired_at
            FROM inventory_items
            WHERE user_id = $1 AND item_id = $2
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_equipped(&self, inventory_id: i64, equipped: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE inventory_items
            SET is_equipped = $2
            WHERE id = $1
            "#,
        )
        .bind(inventory_id)
        .bind(equipped)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unequip_category(
        &self,
        user_id: i64,
        category: &str,
        except_item_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE inventory_items inv
            SET is_equipped = FALSE
            FROM items i
            WHERE i.id = inv.item_id
              AND inv.user_id = $1
              AND i.category = $2
              AND i.id <> $3
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(except_item_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purchase_item(&self, user_id: i64, item_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, category, rarity, price, image_url, description
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("item not found".to_string()))?;

        let owned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM inventory_items WHERE user_id = $1 AND item_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        // Lock the balance row so concurrent purchases serialize.
        let coins: i32 = sqlx::query_scalar(
            r#"
            SELECT coins FROM user_statistics
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("user statistics not found".to_string()))?;

        purchase::admit(coins, item.price, owned).map_err(|e| match e {
            purchase::PurchaseDenied::AlreadyOwned => {
                ApiError::Conflict("item already owned".to_string())
            }
            purchase::PurchaseDenied::InsufficientCoins => {
                ApiError::BadRequest("insufficient coins".to_string())
            }
        })?;

        sqlx::query(
            r#"
            UPDATE user_statistics
            SET coins = coins - $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_items (user_id, item_id, is_equipped)
            VALUES ($1, $2, FALSE)
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("item already owned".to_string())
            }
            _ => ApiError::Database(e),
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_word(&self, word_id: i64) -> Result<Option<Word>> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            SELECT id, english_word, translation, difficulty, category
            FROM words
            WHERE id = $1
            "#,
        )
        .bind(word_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    async fn get_user_word(&self, user_id: i64, word_id: i64) -> Result<Option<UserWord>> {
        let row = sqlx::query_as::<_, UserWord>(
            r#"
            SELECT id, user_id, word_id, knowledge_level, repeat_count,
                   next_review_at, last_reviewed_at
            FROM user_words
            WHERE user_id = $1 AND word_id = $2
            "#,
        )
        .bind(user_id)
        .bind(word_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_user_word(
        &self,
        user_id: i64,
        word_id: i64,
        outcome: &schedule::ReviewOutcome,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_words
                (user_id, word_id, knowledge_level, repeat_count,
                 next_review_at, last_reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(word_id)
        .bind(outcome.knowledge_level)
        .bind(outcome.repeat_count)
        .bind(outcome.next_review_at)
        .bind(outcome.last_reviewed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_user_word(&self, user_word: &UserWord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_words
            SET knowledge_level = $2, repeat_count = $3,
                next_review_at = $4, last_reviewed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user_word.id)
        .bind(user_word.knowledge_level)
        .bind(user_word.repeat_count)
        .bind(user_word.next_review_at)
        .bind(user_word.last_reviewed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_user_words(&self, user_id: i64) -> Result<Vec<UserWordRow>> {
        let rows = sqlx::query_as::<_, UserWordRow>(
            r#"
            SELECT w.id AS word_id, w.english_word, w.translation,
                   w.difficulty, w.category,
                   uw.knowledge_level, uw.repeat_count, uw.next_review_at
            FROM user_words uw
            JOIN words w ON w.id = uw.word_id
            WHERE uw.user_id = $1
            ORDER BY uw.next_review_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
