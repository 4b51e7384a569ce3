//! Read-side data transfer types for the store

use serde::{Deserialize, Serialize};

use crate::domain::AnswerOption;

/// The graded result returned to the submitter.
///
/// Built only after the submission transaction committed, so correct-answer
/// content never leaks out of a failed or rejected submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub question_id: String,
    pub is_correct: bool,
    pub correct_option: AnswerOption,
    pub explanation: Option<String>,
    pub awarded_xp: u64,
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    pub leveled_up: bool,
    pub current_streak: u32,
}

/// One user's row as fed to the leaderboard ranker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub total_correct: u64,
    pub total_daily_points: u64,
    pub total_xp: u64,
    /// Milliseconds since epoch
    pub updated_at: i64,
}

/// Site-wide aggregates for the public stats surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_users: u64,
    pub total_attempts: u64,
    pub total_correct: u64,
    pub active_questions: u64,
}

impl GlobalStats {
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            (self.total_correct as f64 / self.total_attempts as f64) * 100.0
        }
    }
}
