//! Attempt recorder - the single writer of attempts and user progress
//!
//! A submission is one SQLite transaction: insert the attempt, fold it into
//! the user's progress row, commit. Either all of it lands or none of it
//! does, so a cancelled request can never leave a half-updated aggregate.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use super::db::QuizDb;
use super::models::SubmitOutcome;
use crate::domain::{AnswerOption, Attempt, Difficulty, EngineError, Question, Result, UserIdentity};
use crate::progression::{GradedAnswer, UserProgress, XpRewards, apply_attempt, fold_attempts};
use crate::rotation::RotationWindow;

/// Write side of the store
#[derive(Clone)]
pub struct AttemptRecorder {
    db: QuizDb,
}

impl AttemptRecorder {
    pub fn new(db: QuizDb) -> Self {
        Self { db }
    }

    /// Record a graded submission.
    ///
    /// `window` is `Some` for rotation-restricted (daily) submissions, in
    /// which case a prior attempt for the same question inside the window is
    /// rejected as `Conflict`. The duplicate pre-check keeps the common path
    /// clean; the partial unique index is the guarantee under concurrency.
    pub fn submit(
        &self,
        user: &UserIdentity,
        question_id: &str,
        selected: AnswerOption,
        window: Option<&RotationWindow>,
        rewards: &XpRewards,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome> {
        let now_ms = now.timestamp_millis();
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let question = load_question(&tx, question_id)?
            .filter(|q| q.active)
            .ok_or_else(|| EngineError::NotFound(format!("question {question_id}")))?;

        let window_start = window.map(|w| w.start_ms());
        if let Some(start) = window_start {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM attempts WHERE user_id = ?1 AND question_id = ?2 AND window_start = ?3)",
                rusqlite::params![user.user_id, question_id, start],
                |r| r.get(0),
            )?;
            if taken {
                return Err(EngineError::Conflict(
                    "daily question already answered in this rotation window".to_string(),
                ));
            }
        }

        // Materialize the aggregate before the insert: backfill replays the
        // user's attempt history, and the new attempt must not be in it.
        let mut progress = load_or_backfill(&tx, &user.user_id, rewards, now_ms)?;

        let is_correct = selected == question.correct_option;
        let attempt = Attempt {
            user_id: user.user_id.clone(),
            question_id: question_id.to_string(),
            selected_option: selected,
            is_correct,
            is_daily: window.is_some(),
            window_start,
            answered_at: now_ms,
        };
        insert_attempt(&tx, &attempt).map_err(map_constraint_to_conflict)?;

        let old_level = progress.current_level;
        let awarded = apply_attempt(
            &mut progress,
            &GradedAnswer {
                difficulty: question.difficulty,
                is_correct: attempt.is_correct,
                is_daily: attempt.is_daily,
                answered_at: attempt.answered_at,
            },
            rewards,
        );
        upsert_progress(&tx, &progress, user.email.as_deref(), user.display_name.as_deref())?;

        tx.commit()?;

        debug!(
            user = %user.user_id,
            question = %question_id,
            correct = is_correct,
            awarded_xp = awarded,
            "attempt recorded"
        );

        // Correct-answer content is only assembled after the commit
        Ok(SubmitOutcome {
            question_id: question.id,
            is_correct,
            correct_option: question.correct_option,
            explanation: question.explanation,
            awarded_xp: awarded,
            total_xp: progress.total_xp,
            level: progress.current_level,
            title: progress.current_title,
            leveled_up: progress.current_level > old_level,
            current_streak: progress.current_streak,
        })
    }

    /// Add a question to the pool. Returns false if the id already exists.
    pub fn insert_question(&self, question: &Question) -> Result<bool> {
        let conn = self.db.conn();
        let changed = conn.execute(
            r#"INSERT OR IGNORE INTO questions
               (id, prompt, option_a, option_b, option_c, option_d,
                correct_option, difficulty, explanation, active, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            rusqlite::params![
                question.id,
                question.prompt,
                question.option_a,
                question.option_b,
                question.option_c,
                question.option_d,
                question.correct_option.as_str(),
                question.difficulty.as_str(),
                question.explanation,
                question.active as i32,
                question.created_at,
            ],
        )?;
        Ok(changed == 1)
    }

    /// Remove a question from rotation without touching its attempt history
    pub fn deactivate_question(&self, question_id: &str) -> Result<()> {
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE questions SET active = 0 WHERE id = ?1",
            [question_id],
        )?;
        if changed == 0 {
            return Err(EngineError::NotFound(format!("question {question_id}")));
        }
        Ok(())
    }
}

fn insert_attempt(conn: &Connection, attempt: &Attempt) -> rusqlite::Result<()> {
    conn.execute(
        r#"INSERT INTO attempts
           (user_id, question_id, selected_option, is_correct, is_daily, window_start, answered_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        rusqlite::params![
            attempt.user_id,
            attempt.question_id,
            attempt.selected_option.as_str(),
            attempt.is_correct as i32,
            attempt.is_daily as i32,
            attempt.window_start,
            attempt.answered_at,
        ],
    )?;
    Ok(())
}

fn map_constraint_to_conflict(e: rusqlite::Error) -> EngineError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            EngineError::Conflict(
                "daily question already answered in this rotation window".to_string(),
            )
        }
        _ => EngineError::Internal(e),
    }
}

/// Map one questions row
pub(crate) fn load_question(conn: &Connection, id: &str) -> Result<Option<Question>> {
    let mut stmt = conn.prepare(
        r#"SELECT id, prompt, option_a, option_b, option_c, option_d,
                  correct_option, difficulty, explanation, active, created_at
           FROM questions WHERE id = ?1"#,
    )?;
    let mut rows = stmt.query_map([id], question_from_row)?;
    Ok(rows.next().transpose()?)
}

pub(crate) fn question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    let correct: String = row.get(6)?;
    let difficulty: String = row.get(7)?;
    Ok(Question {
        id: row.get(0)?,
        prompt: row.get(1)?,
        option_a: row.get(2)?,
        option_b: row.get(3)?,
        option_c: row.get(4)?,
        option_d: row.get(5)?,
        correct_option: AnswerOption::from_str(&correct).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("unknown option key: {correct}").into(),
            )
        })?,
        difficulty: Difficulty::from_str(&difficulty).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("unknown difficulty: {difficulty}").into(),
            )
        })?,
        explanation: row.get(8)?,
        active: row.get::<_, i32>(9)? != 0,
        created_at: row.get(10)?,
    })
}

/// Load a user's progress row, or create it by replaying their attempt
/// history in chronological order (first-read backfill). A user with no
/// history gets a zeroed row.
pub(crate) fn load_or_backfill(
    conn: &Connection,
    user_id: &str,
    rewards: &XpRewards,
    now_ms: i64,
) -> Result<UserProgress> {
    let existing = conn
        .query_row(
            r#"SELECT user_id, total_xp, current_level, current_title,
                      total_answered, total_correct,
                      easy_answered, easy_correct, medium_answered, medium_correct,
                      hard_answered, hard_correct,
                      current_streak, longest_streak, last_answered_at,
                      total_daily_points, updated_at
               FROM user_progress WHERE user_id = ?1"#,
            [user_id],
            progress_from_row,
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    if let Some(progress) = existing {
        return Ok(progress);
    }

    let mut stmt = conn.prepare(
        r#"SELECT a.is_correct, a.is_daily, a.answered_at, q.difficulty
           FROM attempts a JOIN questions q ON q.id = a.question_id
           WHERE a.user_id = ?1
           ORDER BY a.answered_at, a.id"#,
    )?;
    let answers: Vec<GradedAnswer> = stmt
        .query_map([user_id], |row| {
            let difficulty: String = row.get(3)?;
            Ok(GradedAnswer {
                is_correct: row.get::<_, i32>(0)? != 0,
                is_daily: row.get::<_, i32>(1)? != 0,
                answered_at: row.get(2)?,
                difficulty: Difficulty::from_str(&difficulty).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        format!("unknown difficulty: {difficulty}").into(),
                    )
                })?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;

    let progress = fold_attempts(user_id, &answers, rewards, now_ms);
    upsert_progress(conn, &progress, None, None)?;
    Ok(progress)
}

pub(crate) fn progress_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProgress> {
    Ok(UserProgress {
        user_id: row.get(0)?,
        total_xp: row.get(1)?,
        current_level: row.get(2)?,
        current_title: row.get(3)?,
        total_answered: row.get(4)?,
        total_correct: row.get(5)?,
        easy_answered: row.get(6)?,
        easy_correct: row.get(7)?,
        medium_answered: row.get(8)?,
        medium_correct: row.get(9)?,
        hard_answered: row.get(10)?,
        hard_correct: row.get(11)?,
        current_streak: row.get(12)?,
        longest_streak: row.get(13)?,
        last_answered_at: row.get(14)?,
        total_daily_points: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

/// Upsert the progress row. Identity fields are only overwritten when a
/// fresh value is supplied, so a token without an email never erases one.
pub(crate) fn upsert_progress(
    conn: &Connection,
    progress: &UserProgress,
    email: Option<&str>,
    display_name: Option<&str>,
) -> Result<()> {
    conn.execute(
        r#"INSERT INTO user_progress
           (user_id, email, display_name, total_xp, current_level, current_title,
            total_answered, total_correct,
            easy_answered, easy_correct, medium_answered, medium_correct,
            hard_answered, hard_correct,
            current_streak, longest_streak, last_answered_at, total_daily_points, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
           ON CONFLICT(user_id) DO UPDATE SET
               email = COALESCE(excluded.email, email),
               display_name = COALESCE(excluded.display_name, display_name),
               total_xp = excluded.total_xp,
               current_level = excluded.current_level,
               current_title = excluded.current_title,
               total_answered = excluded.total_answered,
               total_correct = excluded.total_correct,
               easy_answered = excluded.easy_answered,
               easy_correct = excluded.easy_correct,
               medium_answered = excluded.medium_answered,
               medium_correct = excluded.medium_correct,
               hard_answered = excluded.hard_answered,
               hard_correct = excluded.hard_correct,
               current_streak = excluded.current_streak,
               longest_streak = excluded.longest_streak,
               last_answered_at = excluded.last_answered_at,
               total_daily_points = excluded.total_daily_points,
               updated_at = excluded.updated_at"#,
        rusqlite::params![
            progress.user_id,
            email,
            display_name,
            progress.total_xp,
            progress.current_level,
            progress.current_title,
            progress.total_answered,
            progress.total_correct,
            progress.easy_answered,
            progress.easy_correct,
            progress.medium_answered,
            progress.medium_correct,
            progress.hard_answered,
            progress.hard_correct,
            progress.current_streak,
            progress.longest_streak,
            progress.last_answered_at,
            progress.total_daily_points,
            progress.updated_at,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::RotationClock;
    use crate::store::Store;
    use tempfile::tempdir;

    fn test_user(id: &str) -> UserIdentity {
        UserIdentity {
            user_id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            display_name: Some(id.to_string()),
        }
    }

    fn test_question(id: &str, difficulty: Difficulty) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_option: AnswerOption::B,
            difficulty,
            explanation: Some("because".into()),
            active: true,
            created_at: 0,
        }
    }

    fn fixture() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::with_path(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_correct_submission_updates_progress() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Hard))
            .unwrap();

        let outcome = store
            .recorder()
            .submit(&test_user("u1"), "q1", AnswerOption::B, None, &rewards, Utc::now())
            .unwrap();

        assert!(outcome.is_correct);
        assert_eq!(outcome.awarded_xp, 50);
        assert_eq!(outcome.total_xp, 50);
        assert_eq!(outcome.level, 2);
        assert!(outcome.leveled_up);
        assert_eq!(outcome.current_streak, 1);

        let progress = store
            .query()
            .get_progress("u1", &rewards, Utc::now().timestamp_millis())
            .unwrap();
        assert_eq!(progress.total_xp, 50);
        assert_eq!(progress.hard_correct, 1);
    }

    #[test]
    fn test_first_submission_counts_once() {
        // No prior progress row: backfill runs inside the same transaction
        // as the insert and must not replay the attempt being recorded
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Hard))
            .unwrap();

        let outcome = store
            .recorder()
            .submit(&test_user("u1"), "q1", AnswerOption::B, None, &rewards, Utc::now())
            .unwrap();
        assert_eq!(outcome.total_xp, 50);

        let progress = store
            .query()
            .get_progress("u1", &rewards, Utc::now().timestamp_millis())
            .unwrap();
        assert_eq!(progress.total_answered, 1);
        assert_eq!(progress.total_correct, 1);
        assert_eq!(progress.total_xp, 50);
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.hard_answered, 1);
    }

    #[test]
    fn test_duplicate_daily_submission_is_conflict() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        let clock = RotationClock::new(7, 8).unwrap();
        let now = Utc::now();
        let window = clock.window_at(now);
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Easy))
            .unwrap();

        store
            .recorder()
            .submit(&test_user("u1"), "q1", AnswerOption::B, Some(&window), &rewards, now)
            .unwrap();
        let second = store.recorder().submit(
            &test_user("u1"),
            "q1",
            AnswerOption::A,
            Some(&window),
            &rewards,
            now,
        );
        assert!(matches!(second, Err(EngineError::Conflict(_))));

        // Stats reflect only the first submission
        let progress = store
            .query()
            .get_progress("u1", &rewards, now.timestamp_millis())
            .unwrap();
        assert_eq!(progress.total_answered, 1);
        assert_eq!(progress.total_correct, 1);
    }

    #[test]
    fn test_adjacent_windows_allow_resubmission() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        let clock = RotationClock::new(7, 8).unwrap();
        let now = Utc::now();
        let window = clock.window_at(now);
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Easy))
            .unwrap();
        let user = test_user("u1");

        // Just before the boundary, then just after: two different windows
        let late = window.end - chrono::Duration::milliseconds(1);
        let early_next = window.end + chrono::Duration::milliseconds(1);
        store
            .recorder()
            .submit(&user, "q1", AnswerOption::B, Some(&clock.window_at(late)), &rewards, late)
            .unwrap();
        store
            .recorder()
            .submit(
                &user,
                "q1",
                AnswerOption::B,
                Some(&clock.window_at(early_next)),
                &rewards,
                early_next,
            )
            .unwrap();
    }

    #[test]
    fn test_practice_is_unrestricted() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Medium))
            .unwrap();
        let user = test_user("u1");
        for _ in 0..3 {
            store
                .recorder()
                .submit(&user, "q1", AnswerOption::B, None, &rewards, Utc::now())
                .unwrap();
        }
    }

    #[test]
    fn test_missing_or_inactive_question_is_not_found() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();

        let missing = store
            .recorder()
            .submit(&test_user("u1"), "nope", AnswerOption::A, None, &rewards, Utc::now());
        assert!(matches!(missing, Err(EngineError::NotFound(_))));

        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Easy))
            .unwrap();
        store.recorder().deactivate_question("q1").unwrap();
        let inactive = store
            .recorder()
            .submit(&test_user("u1"), "q1", AnswerOption::A, None, &rewards, Utc::now());
        assert!(matches!(inactive, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_backfill_matches_incremental() {
        let (_dir, store) = fixture();
        let rewards = XpRewards::default();
        store
            .recorder()
            .insert_question(&test_question("q1", Difficulty::Easy))
            .unwrap();
        store
            .recorder()
            .insert_question(&test_question("q2", Difficulty::Hard))
            .unwrap();
        let user = test_user("u1");

        let now = Utc::now();
        store
            .recorder()
            .submit(&user, "q1", AnswerOption::B, None, &rewards, now)
            .unwrap();
        store
            .recorder()
            .submit(&user, "q2", AnswerOption::A, None, &rewards, now + chrono::Duration::seconds(1))
            .unwrap();
        let incremental = store
            .query()
            .get_progress("u1", &rewards, now.timestamp_millis())
            .unwrap();

        // Drop the aggregate and rebuild it from history
        store
            .db
            .conn()
            .execute("DELETE FROM user_progress WHERE user_id = 'u1'", [])
            .unwrap();
        let replayed = store
            .query()
            .get_progress("u1", &rewards, now.timestamp_millis())
            .unwrap();

        assert_eq!(replayed, incremental);
    }
}
