//! Spaced-repetition scheduling for vocabulary reviews.
//!
//! Each user/word pair carries an ordinal knowledge level in `0..=5`.
//! The next review is pushed out by a fixed per-level delay: the worse
//! the demonstrated knowledge, the sooner the word comes back.

use chrono::{DateTime, Duration, Utc};

/// Delay before the first review of a newly exposed word.
pub fn first_review_delay() -> Duration {
    Duration::hours(24)
}

/// Delay before the next review for a given knowledge level.
///
/// Out-of-range levels fall back to 24 hours.
pub fn review_interval(knowledge_level: i16) -> Duration {
    match knowledge_level {
        0 => Duration::hours(6),
        1 => Duration::hours(12),
        2 => Duration::hours(24),
        3 => Duration::hours(72),
        4 => Duration::hours(168),
        5 => Duration::hours(336),
        _ => Duration::hours(24),
    }
}

/// Stored review state of a word the user has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewState {
    pub knowledge_level: i16,
    pub repeat_count: i32,
}

/// Result of applying one review to a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub knowledge_level: i16,
    pub repeat_count: i32,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Whether this review earns a words-learned credit: once on first
    /// exposure with level > 0, and once when the stored level first
    /// reaches 5.
    pub learned_credit: bool,
}

/// Apply a review at `now`, given the previously stored state (`None`
/// for first exposure).
pub fn apply_review(
    previous: Option<ReviewState>,
    knowledge_level: i16,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    match previous {
        None => ReviewOutcome {
            knowledge_level,
            repeat_count: 1,
            next_review_at: now + first_review_delay(),
            last_reviewed_at: None,
            learned_credit: knowledge_level > 0,
        },
        Some(prev) => ReviewOutcome {
            knowledge_level,
            repeat_count: prev.repeat_count + 1,
            next_review_at: now + review_interval(knowledge_level),
            last_reviewed_at: Some(now),
            learned_credit: knowledge_level == 5 && prev.knowledge_level < 5,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn interval_table_matches_policy() {
        assert_eq!(review_interval(0), Duration::hours(6));
        assert_eq!(review_interval(1), Duration::hours(12));
        assert_eq!(review_interval(2), Duration::hours(24));
        assert_eq!(review_interval(3), Duration::hours(72));
        assert_eq!(review_interval(4), Duration::hours(168));
        assert_eq!(review_interval(5), Duration::hours(336));
    }

    #[test]
    fn out_of_range_level_falls_back_to_24h() {
        assert_eq!(review_interval(-1), Duration::hours(24));
        assert_eq!(review_interval(6), Duration::hours(24));
        assert_eq!(review_interval(100), Duration::hours(24));
    }

    #[test]
    fn first_exposure_schedules_in_24h() {
        let t = now();
        let outcome = apply_review(None, 3, t);
        assert_eq!(outcome.repeat_count, 1);
        assert_eq!(outcome.knowledge_level, 3);
        assert_eq!(outcome.next_review_at, t + Duration::hours(24));
        assert_eq!(outcome.last_reviewed_at, None);
    }

    #[test]
    fn first_exposure_credits_when_level_above_zero() {
        let t = now();
        assert!(apply_review(None, 1, t).learned_credit);
        assert!(apply_review(None, 5, t).learned_credit);
        assert!(!apply_review(None, 0, t).learned_credit);
    }

    #[test]
    fn repeat_review_uses_interval_table() {
        let t = now();
        let prev = ReviewState {
            knowledge_level: 2,
            repeat_count: 3,
        };
        let outcome = apply_review(Some(prev), 4, t);
        assert_eq!(outcome.repeat_count, 4);
        assert_eq!(outcome.next_review_at, t + Duration::hours(168));
        assert_eq!(outcome.last_reviewed_at, Some(t));
    }

    #[test]
    fn mastery_credit_awarded_once() {
        let t = now();
        let below = ReviewState {
            knowledge_level: 4,
            repeat_count: 5,
        };
        assert!(apply_review(Some(below), 5, t).learned_credit);

        let mastered = ReviewState {
            knowledge_level: 5,
            repeat_count: 6,
        };
        assert!(!apply_review(Some(mastered), 5, t).learned_credit);
    }

    #[test]
    fn dropping_below_mastery_earns_no_credit() {
        let t = now();
        let mastered = ReviewState {
            knowledge_level: 5,
            repeat_count: 6,
        };
        let outcome = apply_review(Some(mastered), 2, t);
        assert!(!outcome.learned_credit);
        assert_eq!(outcome.next_review_at, t + Duration::hours(24));
    }
}
