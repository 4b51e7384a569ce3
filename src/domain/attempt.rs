//! Attempt records - immutable, append-only

use serde::{Deserialize, Serialize};

use super::question::AnswerOption;

/// One graded answer submission. Never mutated or deleted once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub user_id: String,
    pub question_id: String,
    pub selected_option: AnswerOption,
    pub is_correct: bool,
    /// True for rotation-restricted (daily) submissions
    pub is_daily: bool,
    /// Start instant of the rotation window the attempt fell into,
    /// ms since epoch. None for unrestricted practice attempts.
    pub window_start: Option<i64>,
    /// Milliseconds since epoch
    pub answered_at: i64,
}
