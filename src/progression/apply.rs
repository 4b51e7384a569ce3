//! Stats aggregation - applying graded answers to a user's running progress
//!
//! One pure fold is shared by the live submission path and by first-read
//! backfill, so replaying N historical attempts in chronological order
//! produces exactly the aggregate that incremental application would have.

use serde::{Deserialize, Serialize};

use super::levels::LevelThreshold;
use crate::domain::Difficulty;

/// XP awarded per correct answer, by difficulty
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct XpRewards {
    #[serde(default = "default_easy_xp")]
    pub easy: u64,
    #[serde(default = "default_medium_xp")]
    pub medium: u64,
    #[serde(default = "default_hard_xp")]
    pub hard: u64,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            easy: default_easy_xp(),
            medium: default_medium_xp(),
            hard: default_hard_xp(),
        }
    }
}

fn default_easy_xp() -> u64 {
    10
}

fn default_medium_xp() -> u64 {
    25
}

fn default_hard_xp() -> u64 {
    50
}

impl XpRewards {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// The slice of an attempt the aggregator needs
#[derive(Debug, Clone, Copy)]
pub struct GradedAnswer {
    pub difficulty: Difficulty,
    pub is_correct: bool,
    pub is_daily: bool,
    /// Milliseconds since epoch
    pub answered_at: i64,
}

/// Per-user running statistics.
///
/// Owned exclusively by the attempt recorder; `current_level` and
/// `current_title` are always derived from `total_xp`, never stored
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub total_xp: u64,
    pub current_level: u32,
    pub current_title: String,
    pub total_answered: u64,
    pub total_correct: u64,
    pub easy_answered: u64,
    pub easy_correct: u64,
    pub medium_answered: u64,
    pub medium_correct: u64,
    pub hard_answered: u64,
    pub hard_correct: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_answered_at: Option<i64>,
    pub total_daily_points: u64,
    pub updated_at: i64,
}

impl UserProgress {
    /// Zeroed progress for a user with no recorded attempts
    pub fn empty(user_id: impl Into<String>, now: i64) -> Self {
        let base = LevelThreshold::for_xp(0);
        Self {
            user_id: user_id.into(),
            total_xp: 0,
            current_level: base.level,
            current_title: base.title.to_string(),
            total_answered: 0,
            total_correct: 0,
            easy_answered: 0,
            easy_correct: 0,
            medium_answered: 0,
            medium_correct: 0,
            hard_answered: 0,
            hard_correct: 0,
            current_streak: 0,
            longest_streak: 0,
            last_answered_at: None,
            total_daily_points: 0,
            updated_at: now,
        }
    }

    /// Overall accuracy as a percentage in [0, 100]
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_answered == 0 {
            0.0
        } else {
            (self.total_correct as f64 / self.total_answered as f64) * 100.0
        }
    }
}

/// Apply one graded answer to the aggregate. Returns the XP awarded.
///
/// `updated_at` is set from the answer's own timestamp, not the wall clock,
/// so backfill and incremental application stay byte-identical.
pub fn apply_attempt(
    progress: &mut UserProgress,
    answer: &GradedAnswer,
    rewards: &XpRewards,
) -> u64 {
    progress.total_answered += 1;
    let (answered, correct) = match answer.difficulty {
        Difficulty::Easy => (&mut progress.easy_answered, &mut progress.easy_correct),
        Difficulty::Medium => (&mut progress.medium_answered, &mut progress.medium_correct),
        Difficulty::Hard => (&mut progress.hard_answered, &mut progress.hard_correct),
    };
    *answered += 1;

    let awarded = if answer.is_correct {
        progress.total_correct += 1;
        *correct += 1;
        progress.current_streak += 1;
        progress.longest_streak = progress.longest_streak.max(progress.current_streak);
        let xp = rewards.for_difficulty(answer.difficulty);
        progress.total_xp += xp;
        if answer.is_daily {
            progress.total_daily_points += xp;
        }
        xp
    } else {
        progress.current_streak = 0;
        0
    };

    let level = LevelThreshold::for_xp(progress.total_xp as i64);
    progress.current_level = level.level;
    progress.current_title = level.title.to_string();
    progress.last_answered_at = Some(answer.answered_at);
    progress.updated_at = answer.answered_at;

    awarded
}

/// Fold a user's historical answers (chronological order) into an aggregate.
/// Used for first-read backfill when no progress row exists yet.
pub fn fold_attempts<'a>(
    user_id: &str,
    answers: impl IntoIterator<Item = &'a GradedAnswer>,
    rewards: &XpRewards,
    now: i64,
) -> UserProgress {
    let mut progress = UserProgress::empty(user_id, now);
    for answer in answers {
        apply_attempt(&mut progress, answer, rewards);
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(difficulty: Difficulty, is_correct: bool, at: i64) -> GradedAnswer {
        GradedAnswer {
            difficulty,
            is_correct,
            is_daily: false,
            answered_at: at,
        }
    }

    #[test]
    fn test_hard_correct_from_zero() {
        let rewards = XpRewards::default();
        let mut p = UserProgress::empty("u1", 0);
        let awarded = apply_attempt(&mut p, &answer(Difficulty::Hard, true, 1000), &rewards);

        assert_eq!(awarded, 50);
        assert_eq!(p.total_xp, 50);
        assert_eq!(p.current_level, 2); // curve: level 2 at 50 XP
        assert_eq!(p.current_streak, 1);
        assert_eq!(p.longest_streak, 1);
        assert_eq!(p.hard_answered, 1);
        assert_eq!(p.hard_correct, 1);
        assert_eq!(p.last_answered_at, Some(1000));
    }

    #[test]
    fn test_streak_resets_on_incorrect() {
        let rewards = XpRewards::default();
        let mut p = UserProgress::empty("u1", 0);
        for t in 0..3 {
            apply_attempt(&mut p, &answer(Difficulty::Easy, true, t), &rewards);
        }
        assert_eq!(p.current_streak, 3);

        apply_attempt(&mut p, &answer(Difficulty::Easy, false, 3), &rewards);
        assert_eq!(p.current_streak, 0);
        assert_eq!(p.longest_streak, 3);
        assert_eq!(p.total_answered, 4);
        assert_eq!(p.total_correct, 3);
    }

    #[test]
    fn test_daily_points_only_on_daily_correct() {
        let rewards = XpRewards::default();
        let mut p = UserProgress::empty("u1", 0);

        let mut daily = answer(Difficulty::Medium, true, 1);
        daily.is_daily = true;
        apply_attempt(&mut p, &daily, &rewards);
        assert_eq!(p.total_daily_points, 25);

        let mut daily_wrong = answer(Difficulty::Medium, false, 2);
        daily_wrong.is_daily = true;
        apply_attempt(&mut p, &daily_wrong, &rewards);
        assert_eq!(p.total_daily_points, 25);

        apply_attempt(&mut p, &answer(Difficulty::Hard, true, 3), &rewards);
        assert_eq!(p.total_daily_points, 25); // practice never adds daily points
        assert_eq!(p.total_xp, 25 + 50);
    }

    #[test]
    fn test_fold_equals_incremental() {
        let rewards = XpRewards::default();
        let answers: Vec<GradedAnswer> = (0..20)
            .map(|i| {
                let difficulty = match i % 3 {
                    0 => Difficulty::Easy,
                    1 => Difficulty::Medium,
                    _ => Difficulty::Hard,
                };
                GradedAnswer {
                    difficulty,
                    is_correct: i % 4 != 0,
                    is_daily: i % 5 == 0,
                    answered_at: i,
                }
            })
            .collect();

        let folded = fold_attempts("u1", &answers, &rewards, 999);

        let mut incremental = UserProgress::empty("u1", 999);
        for a in &answers {
            apply_attempt(&mut incremental, a, &rewards);
        }
        assert_eq!(folded, incremental);
    }

    #[test]
    fn test_accuracy_percent() {
        let mut p = UserProgress::empty("u1", 0);
        assert_eq!(p.accuracy_percent(), 0.0);
        p.total_answered = 4;
        p.total_correct = 3;
        assert!((p.accuracy_percent() - 75.0).abs() < 1e-9);
    }
}
