//! Progression logic: level curve, XP math, and stats aggregation

mod apply;
mod levels;

pub use apply::{GradedAnswer, UserProgress, XpRewards, apply_attempt, fold_attempts};
pub use levels::{LEVELS, LevelThreshold};
