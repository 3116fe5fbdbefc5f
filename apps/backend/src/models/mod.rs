//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// === Database Entity Types ===

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Refresh token row; at most one per user
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-user progress counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStatistics {
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub level: i32,
    pub experience: i32,
    pub coins: i32,
    pub words_learned: i32,
    pub lessons_completed: i32,
    pub days_streak: i32,
    pub last_active: DateTime<Utc>,
}

impl UserStatistics {
    /// Row created at registration time: empty counters, no coin bonus.
    pub fn zeroed(user_id: i64) -> Self {
        Self {
            user_id,
            level: 1,
            experience: 0,
            coins: 0,
            words_learned: 0,
            lessons_completed: 0,
            days_streak: 0,
            last_active: Utc::now(),
        }
    }

    /// Row created lazily on first profile access: starting coin bonus.
    pub fn seeded(user_id: i64) -> Self {
        Self {
            coins: 100,
            ..Self::zeroed(user_id)
        }
    }
}

/// Shop catalog entry (immutable reference data)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: String,
    pub rarity: String,
    pub price: i32,
    pub image_url: String,
    pub description: String,
}

/// Ownership link between a user and a catalog item
#[derive(Debug, Clone, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub is_equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

/// Vocabulary catalog entry (immutable reference data)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Word {
    pub id: i64,
    pub english_word: String,
    pub translation: String,
    pub difficulty: i32,
    pub category: String,
}

/// Per-user-per-word learning record
#[derive(Debug, Clone, FromRow)]
pub struct UserWord {
    pub id: i64,
    pub user_id: i64,
    pub word_id: i64,
    pub knowledge_level: i16,
    pub repeat_count: i32,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

// === Joined Rows ===

/// Inventory row joined with its catalog item
#[derive(Debug, Clone, FromRow)]
pub struct InventoryRow {
    pub id: i64,
    pub is_equipped: bool,
    pub acquired_at: DateTime<Utc>,
    pub item_id: i64,
    pub name: String,
    pub item_type: String,
    pub category: String,
    pub rarity: String,
    pub price: i32,
    pub image_url: String,
    pub description: String,
}

impl InventoryRow {
    pub fn to_api(&self) -> InventoryItemDto {
        InventoryItemDto {
            id: self.id,
            is_equipped: self.is_equipped,
            acquired_at: self.acquired_at,
            item: ItemDto {
                id: self.item_id,
                name: self.name.clone(),
                item_type: self.item_type.clone(),
                category: self.category.clone(),
                rarity: self.rarity.clone(),
                price: self.price,
                image_url: self.image_url.clone(),
                description: self.description.clone(),
            },
        }
    }
}

/// User word joined with its catalog word
#[derive(Debug, Clone, FromRow)]
pub struct UserWordRow {
    pub word_id: i64,
    pub english_word: String,
    pub translation: String,
    pub difficulty: i32,
    pub category: String,
    pub knowledge_level: i16,
    pub repeat_count: i32,
    pub next_review_at: DateTime<Utc>,
}

impl UserWordRow {
    pub fn to_api(&self) -> WordDto {
        WordDto {
            id: self.word_id,
            english_word: self.english_word.clone(),
            translation: self.translation.clone(),
            difficulty: self.difficulty,
            category: self.category.clone(),
            knowledge_level: self.knowledge_level,
            repeat_count: self.repeat_count,
            next_review_at: self.next_review_at,
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Credential pair plus the public user record
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: String,
    pub rarity: String,
    pub price: i32,
    pub image_url: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemDto {
    pub id: i64,
    pub item: ItemDto,
    pub is_equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordDto {
    pub id: i64,
    pub english_word: String,
    pub translation: String,
    pub difficulty: i32,
    pub category: String,
    pub knowledge_level: i16,
    pub repeat_count: i32,
    pub next_review_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub user: User,
    pub statistics: UserStatistics,
    pub inventory: Vec<InventoryItemDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordsResponse {
    pub words: Vec<WordDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnWordRequest {
    pub word_id: i64,
    pub knowledge_level: i16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryResponse {
    pub inventory: Vec<InventoryItemDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseItemRequest {
    pub item_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub status: String,
    pub profile: UserProfileResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateInventoryRequest {
    pub item_id: i64,
    pub is_equipped: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressRequest {
    pub experience: i32,
    pub coins: i32,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub statistics: UserStatistics,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
