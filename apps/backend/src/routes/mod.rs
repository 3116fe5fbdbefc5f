pub mod auth;
pub mod inventory;
pub mod profile;
pub mod words;
