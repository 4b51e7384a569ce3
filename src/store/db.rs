//! SQLite connection and schema management
//!
//! Manages the quizmill database with versioned inline migrations. The
//! at-most-one-per-window guarantee for daily attempts is a storage-level
//! partial unique index, never process memory, so parallel request handlers
//! (or parallel processes) cannot double-record.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config;

/// Database wrapper shared across recorder and query handles
#[derive(Clone)]
pub struct QuizDb {
    conn: Arc<Mutex<Connection>>,
}

impl QuizDb {
    /// Open or create the database at the default location (~/.quizmill/quizmill.db)
    pub fn open_default() -> Result<Self> {
        let db_path = config::data_dir().join("quizmill.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open quiz db: {}", path.display()))?;

        // WAL mode for concurrent readers alongside the writer
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection for a sequence of statements
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Quiz DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: covering index for the "answered this window" check
        if version < 2 {
            conn.execute_batch(
                r#"
                CREATE INDEX IF NOT EXISTS idx_attempt_daily
                    ON attempts(user_id, is_daily, answered_at);
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }
}

/// SQL schema for the quiz database
const SCHEMA_SQL: &str = r#"
-- Question pool
CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    prompt TEXT NOT NULL,
    option_a TEXT NOT NULL,
    option_b TEXT NOT NULL,
    option_c TEXT NOT NULL,
    option_d TEXT NOT NULL,
    correct_option TEXT NOT NULL CHECK (correct_option IN ('A','B','C','D')),
    difficulty TEXT NOT NULL CHECK (difficulty IN ('easy','medium','hard')),
    explanation TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_question_active ON questions(active, created_at, id);

-- Graded submissions (append-only, never mutated)
CREATE TABLE IF NOT EXISTS attempts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    question_id TEXT NOT NULL,
    selected_option TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    is_daily INTEGER NOT NULL DEFAULT 0,
    window_start INTEGER,
    answered_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_attempt_user_time ON attempts(user_id, answered_at, id);

-- At most one daily attempt per (user, question, rotation window).
-- Practice attempts carry NULL window_start and are unrestricted.
CREATE UNIQUE INDEX IF NOT EXISTS idx_attempt_daily_once
    ON attempts(user_id, question_id, window_start)
    WHERE window_start IS NOT NULL;

-- Per-user running statistics (one row per user)
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT PRIMARY KEY,
    email TEXT,
    display_name TEXT,
    total_xp INTEGER NOT NULL DEFAULT 0,
    current_level INTEGER NOT NULL DEFAULT 1,
    current_title TEXT NOT NULL DEFAULT 'Rookie',
    total_answered INTEGER NOT NULL DEFAULT 0,
    total_correct INTEGER NOT NULL DEFAULT 0,
    easy_answered INTEGER NOT NULL DEFAULT 0,
    easy_correct INTEGER NOT NULL DEFAULT 0,
    medium_answered INTEGER NOT NULL DEFAULT 0,
    medium_correct INTEGER NOT NULL DEFAULT 0,
    hard_answered INTEGER NOT NULL DEFAULT 0,
    hard_correct INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_answered_at INTEGER,
    total_daily_points INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_progress_updated ON user_progress(updated_at);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_init() {
        let dir = tempdir().unwrap();
        let db = QuizDb::open(&dir.path().join("test.db")).unwrap();

        let conn = db.conn();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"questions".to_string()));
        assert!(tables.contains(&"attempts".to_string()));
        assert!(tables.contains(&"user_progress".to_string()));
    }

    #[test]
    fn test_migrations_reach_latest_version() {
        let dir = tempdir().unwrap();
        let db = QuizDb::open(&dir.path().join("test.db")).unwrap();
        let version: i32 = db
            .conn()
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_daily_unique_index_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let db = QuizDb::open(&dir.path().join("test.db")).unwrap();
        let conn = db.conn();

        let insert = "INSERT INTO attempts (user_id, question_id, selected_option, is_correct, is_daily, window_start, answered_at) \
                      VALUES ('u1', 'q1', 'A', 1, 1, 1000, 2000)";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());

        // NULL window_start (practice) is never restricted
        let practice = "INSERT INTO attempts (user_id, question_id, selected_option, is_correct, is_daily, window_start, answered_at) \
                        VALUES ('u1', 'q1', 'A', 1, 0, NULL, 2000)";
        conn.execute(practice, []).unwrap();
        conn.execute(practice, []).unwrap();
    }
}
