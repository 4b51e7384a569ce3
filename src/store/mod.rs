//! Persistent storage for quizmill
//!
//! Questions, attempts, and per-user progress live in a SQLite database
//! (`~/.quizmill/quizmill.db` by default).
//!
//! # Usage
//!
//! ```ignore
//! let store = Store::with_path(&path)?;
//!
//! // Record a graded submission
//! let outcome = store.recorder().submit(&user, &question, selected, daily, &rewards, now)?;
//!
//! // Read-side queries
//! let progress = store.query().get_progress("user-1", &rewards, now_ms)?;
//! ```

mod db;
mod models;
mod queries;
mod recorder;

pub use db::QuizDb;
pub use models::{GlobalStats, ProgressSnapshot, SubmitOutcome};
pub use queries::ProgressQuery;
pub use recorder::AttemptRecorder;

use anyhow::Result;

/// Central handle for quiz storage.
///
/// Thread-safe through an internal mutex on the database connection; clones
/// share the connection.
#[derive(Clone)]
pub struct Store {
    db: QuizDb,
}

impl Store {
    /// Open the store at the default database location
    pub fn open_default() -> Result<Self> {
        let db = QuizDb::open_default()?;
        Ok(Self { db })
    }

    /// Open the store at a specific database path
    pub fn with_path(path: &std::path::Path) -> Result<Self> {
        let db = QuizDb::open(path)?;
        Ok(Self { db })
    }

    /// Write side: attempt submission and question pool maintenance
    pub fn recorder(&self) -> AttemptRecorder {
        AttemptRecorder::new(self.db.clone())
    }

    /// Read side: progress, leaderboard snapshots, aggregates
    pub fn query(&self) -> ProgressQuery {
        ProgressQuery::new(self.db.clone())
    }
}
