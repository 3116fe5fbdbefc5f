//! User-facing domain operations: profile and statistics, vocabulary
//! review tracking, and the shop inventory.

use chrono::Utc;

use engkids_core::{leveling, schedule};

use crate::error::{ApiError, Result};
use crate::models::{
    InventoryRow, Item, LearnWordRequest, ProgressRequest, UpdateInventoryRequest,
    UserProfileResponse, UserStatistics, UserWord, UserWordRow, Word,
};

/// Storage capabilities the user service needs. The purchase flow is a
/// single capability so the store keeps it atomic; the admission policy
/// itself lives in `engkids_core::purchase`.
#[allow(async_fn_in_trait)]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<crate::models::User>>;

    async fn get_statistics(&self, user_id: i64) -> Result<Option<UserStatistics>>;
    async fn insert_statistics(&self, stats: &UserStatistics) -> Result<()>;
    async fn save_statistics(&self, stats: &UserStatistics) -> Result<()>;
    async fn touch_last_active(&self, user_id: i64) -> Result<()>;
    /// Atomic increment of the words-learned counter.
    async fn increment_words_learned(&self, user_id: i64) -> Result<()>;

    async fn get_item(&self, item_id: i64) -> Result<Option<Item>>;
    async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryRow>>;
    async fn find_inventory_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<Option<crate::models::InventoryItem>>;
    async fn set_equipped(&self, inventory_id: i64, equipped: bool) -> Result<()>;
    /// Clear the equipped flag on every owned item in `category` except
    /// `except_item_id`.
    async fn unequip_category(
        &self,
        user_id: i64,
        category: &str,
        except_item_id: i64,
    ) -> Result<()>;
    /// Atomic purchase: item lookup, ownership and funds checks, debit
    /// and grant, all in one unit of work.
    async fn purchase_item(&self, user_id: i64, item_id: i64) -> Result<()>;

    async fn get_word(&self, word_id: i64) -> Result<Option<Word>>;
    async fn get_user_word(&self, user_id: i64, word_id: i64) -> Result<Option<UserWord>>;
    async fn insert_user_word(
        &self,
        user_id: i64,
        word_id: i64,
        outcome: &schedule::ReviewOutcome,
    ) -> Result<()>;
    async fn update_user_word(&self, user_word: &UserWord) -> Result<()>;
    async fn list_user_words(&self, user_id: i64) -> Result<Vec<UserWordRow>>;
}

pub struct UserService<S> {
    store: S,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Profile with statistics (created lazily with the starting coin
    /// bonus when absent) and inventory.
    pub async fn profile(&self, user_id: i64) -> Result<UserProfileResponse> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        let statistics = self.get_or_create_statistics(user_id).await?;
        let inventory = self.store.list_inventory(user_id).await?;

        Ok(UserProfileResponse {
            user,
            statistics,
            inventory: inventory.iter().map(InventoryRow::to_api).collect(),
        })
    }

    pub async fn get_or_create_statistics(&self, user_id: i64) -> Result<UserStatistics> {
        match self.store.get_statistics(user_id).await? {
            Some(mut stats) => {
                self.store.touch_last_active(user_id).await?;
                stats.last_active = Utc::now();
                Ok(stats)
            }
            None => {
                let stats = UserStatistics::seeded(user_id);
                self.store.insert_statistics(&stats).await?;
                Ok(stats)
            }
        }
    }

    /// Apply a reward grant, levelling up per the progression rules.
    pub async fn apply_progress(
        &self,
        user_id: i64,
        req: &ProgressRequest,
    ) -> Result<UserStatistics> {
        let mut stats = self.get_or_create_statistics(user_id).await?;

        let progressed = leveling::apply_reward(
            leveling::Progress {
                level: stats.level,
                experience: stats.experience,
                coins: stats.coins,
            },
            req.experience,
            req.coins,
        );
        stats.level = progressed.level;
        stats.experience = progressed.experience;
        stats.coins = progressed.coins;

        self.store.save_statistics(&stats).await?;
        Ok(stats)
    }

    pub async fn inventory(&self, user_id: i64) -> Result<Vec<crate::models::InventoryItemDto>> {
        let rows = self.store.list_inventory(user_id).await?;
        Ok(rows.iter().map(InventoryRow::to_api).collect())
    }

    pub async fn purchase_item(&self, user_id: i64, item_id: i64) -> Result<UserProfileResponse> {
        self.store.purchase_item(user_id, item_id).await?;
        tracing::info!(user_id, item_id, "item purchased");
        self.profile(user_id).await
    }

    /// Equip or unequip an owned item. Equipping clears the flag on
    /// every other owned item in the same catalog category.
    pub async fn update_inventory_item(
        &self,
        user_id: i64,
        req: &UpdateInventoryRequest,
    ) -> Result<()> {
        let owned = self
            .store
            .find_inventory_item(user_id, req.item_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("item not in your inventory".to_string()))?;

        if req.is_equipped {
            let item = self
                .store
                .get_item(owned.item_id)
                .await?
                .ok_or_else(|| ApiError::Internal("catalog item missing".to_string()))?;
            self.store
                .unequip_category(user_id, &item.category, item.id)
                .await?;
        }

        self.store.set_equipped(owned.id, req.is_equipped).await
    }

    pub async fn user_words(&self, user_id: i64) -> Result<Vec<crate::models::WordDto>> {
        let rows = self.store.list_user_words(user_id).await?;
        Ok(rows.iter().map(UserWordRow::to_api).collect())
    }

    /// Record one vocabulary review and reschedule the word.
    pub async fn learn_word(&self, user_id: i64, req: &LearnWordRequest) -> Result<()> {
        let word = self
            .store
            .get_word(req.word_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("word not found".to_string()))?;

        let existing = self.store.get_user_word(user_id, word.id).await?;
        let previous = existing.as_ref().map(|uw| schedule::ReviewState {
            knowledge_level: uw.knowledge_level,
            repeat_count: uw.repeat_count,
        });

        let outcome = schedule::apply_review(previous, req.knowledge_level, Utc::now());

        match existing {
            None => {
                self.store
                    .insert_user_word(user_id, word.id, &outcome)
                    .await?
            }
            Some(mut uw) => {
                uw.knowledge_level = outcome.knowledge_level;
                uw.repeat_count = outcome.repeat_count;
                uw.next_review_at = outcome.next_review_at;
                uw.last_reviewed_at = outcome.last_reviewed_at;
                self.store.update_user_word(&uw).await?;
            }
        }

        if outcome.learned_credit {
            self.store.increment_words_learned(user_id).await?;
        }

        Ok(())
    }
}
