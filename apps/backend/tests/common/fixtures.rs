//! Factory functions for request bodies used across integration tests.

use serde_json::{json, Value};
use uuid::Uuid;

/// Unique email so parallel tests never collide on the unique index.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

pub fn register_request(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

pub fn login_request(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

pub fn refresh_request(refresh_token: &str) -> Value {
    json!({ "refresh_token": refresh_token })
}

pub fn learn_request(word_id: i64, knowledge_level: i16) -> Value {
    json!({ "word_id": word_id, "knowledge_level": knowledge_level })
}

pub fn purchase_request(item_id: i64) -> Value {
    json!({ "item_id": item_id })
}

pub fn equip_request(item_id: i64, is_equipped: bool) -> Value {
    json!({ "item_id": item_id, "is_equipped": is_equipped })
}

pub fn progress_request(experience: i32, coins: i32) -> Value {
    json!({ "experience": experience, "coins": coins })
}
