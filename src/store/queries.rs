//! Read-side queries: progress, pool snapshots, leaderboard feeds, aggregates

use super::db::QuizDb;
use super::models::{GlobalStats, ProgressSnapshot};
use super::recorder::{load_or_backfill, load_question, question_from_row};
use crate::domain::{Question, Result};
use crate::progression::{UserProgress, XpRewards};

/// Query interface over the quiz store
pub struct ProgressQuery {
    db: QuizDb,
}

impl ProgressQuery {
    pub fn new(db: QuizDb) -> Self {
        Self { db }
    }

    /// A user's progress row, created by backfill on first read if absent
    pub fn get_progress(&self, user_id: &str, rewards: &XpRewards, now_ms: i64) -> Result<UserProgress> {
        let conn = self.db.conn();
        load_or_backfill(&conn, user_id, rewards, now_ms)
    }

    /// One question by id (active or not)
    pub fn get_question(&self, question_id: &str) -> Result<Option<Question>> {
        let conn = self.db.conn();
        load_question(&conn, question_id)
    }

    /// The active question pool in stable order (creation time, then id).
    /// This order is what keys the daily selector.
    pub fn active_pool(&self) -> Result<Vec<Question>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, prompt, option_a, option_b, option_c, option_d,
                      correct_option, difficulty, explanation, active, created_at
               FROM questions WHERE active = 1
               ORDER BY created_at, id"#,
        )?;
        let questions = stmt
            .query_map([], question_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    /// Whether the user already has a daily attempt for this question in the
    /// window starting at `window_start_ms`
    pub fn daily_attempt_exists(
        &self,
        user_id: &str,
        question_id: &str,
        window_start_ms: i64,
    ) -> Result<bool> {
        let conn = self.db.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM attempts WHERE user_id = ?1 AND question_id = ?2 AND window_start = ?3)",
            rusqlite::params![user_id, question_id, window_start_ms],
            |r| r.get(0),
        )?;
        Ok(exists)
    }

    /// Progress snapshots for the leaderboard ranker, optionally restricted
    /// to rows updated at or after `since_ms`
    pub fn leaderboard_snapshots(&self, since_ms: Option<i64>) -> Result<Vec<ProgressSnapshot>> {
        let conn = self.db.conn();
        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<ProgressSnapshot> {
            Ok(ProgressSnapshot {
                user_id: row.get(0)?,
                display_name: row.get(1)?,
                email: row.get(2)?,
                total_correct: row.get(3)?,
                total_daily_points: row.get(4)?,
                total_xp: row.get(5)?,
                updated_at: row.get(6)?,
            })
        };
        let sql_base = "SELECT user_id, display_name, email, total_correct, total_daily_points, total_xp, updated_at FROM user_progress";
        let snapshots = if let Some(since) = since_ms {
            let mut stmt = conn.prepare(&format!("{sql_base} WHERE updated_at >= ?1"))?;
            let rows = stmt.query_map([since], map)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let mut stmt = conn.prepare(sql_base)?;
            let rows = stmt.query_map([], map)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(snapshots)
    }

    /// Site-wide aggregates for the public stats surface
    pub fn global_stats(&self) -> Result<GlobalStats> {
        let conn = self.db.conn();
        let (total_attempts, total_correct) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_correct), 0) FROM attempts",
            [],
            |r| Ok((r.get::<_, u64>(0)?, r.get::<_, u64>(1)?)),
        )?;
        let total_users: u64 = conn.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM attempts",
            [],
            |r| r.get(0),
        )?;
        let active_questions: u64 =
            conn.query_row("SELECT COUNT(*) FROM questions WHERE active = 1", [], |r| r.get(0))?;
        Ok(GlobalStats {
            total_users,
            total_attempts,
            total_correct,
            active_questions,
        })
    }
}
