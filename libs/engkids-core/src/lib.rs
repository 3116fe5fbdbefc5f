//! Core domain policy shared by the EngKids backend.
//!
//! Provides:
//! - Spaced-repetition review scheduling (fixed interval table)
//! - Experience/level progression rules
//! - Purchase admission policy (ownership and funds checks)
//!
//! Everything in this crate is pure: no storage, no clocks beyond the
//! timestamps passed in, so the policies can be tested in isolation.

pub mod leveling;
pub mod purchase;
pub mod schedule;

pub use leveling::{apply_reward, Progress};
pub use purchase::{admit, PurchaseDenied};
pub use schedule::{apply_review, review_interval, ReviewOutcome, ReviewState};
