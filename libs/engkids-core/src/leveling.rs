//! Experience and level progression.
//!
//! Reaching `level * 100` experience raises the level by one and grants
//! a coin bonus of ten times the new level. At most one level is gained
//! per reward grant.

/// Level, experience and coin balance of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: i32,
    pub experience: i32,
    pub coins: i32,
}

/// Apply an experience/coin reward grant, levelling up when the
/// threshold is crossed.
pub fn apply_reward(current: Progress, experience: i32, coins: i32) -> Progress {
    let mut next = Progress {
        level: current.level,
        experience: current.experience + experience,
        coins: current.coins + coins,
    };

    let threshold = next.level * 100;
    if next.experience >= threshold {
        next.level += 1;
        next.coins += next.level * 10;
    }

    next
}
