//! The engine facade
//!
//! `QuizEngine` wires the rotation clock, the store, and the response cache
//! behind one explicitly constructed service object. Nothing here reads
//! ambient global state; every method takes `now` so behavior is a pure
//! function of its inputs plus the store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::daily::select_daily;
use crate::domain::{
    AnswerOption, Difficulty, EngineError, Identity, Question, Result,
};
use crate::leaderboard::{self, LeaderboardEntry, Metric, TimeFilter};
use crate::progression::{LevelThreshold, UserProgress};
use crate::rotation::RotationClock;
use crate::store::{Store, SubmitOutcome};

/// A submission, already validated into strong types at the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Required for practice; optional for daily (the engine resolves the
    /// window's question, and a supplied id must match it)
    pub question_id: Option<String>,
    pub selected_option: AnswerOption,
    /// Rotation-restricted daily submission
    pub daily: bool,
}

/// Today's question as shown to a player. Carries no correct-answer content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuestionView {
    pub question_id: String,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub difficulty: Difficulty,
    /// Window bounds, ms since epoch
    pub window_start: i64,
    pub next_reset: i64,
    /// Whether the requesting user already answered in this window.
    /// Always false for anonymous requests.
    pub already_answered: bool,
}

/// Profile surface: the stored aggregate plus derived display values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub progress: UserProgress,
    pub xp_to_next_level: u64,
    pub progress_percent: f64,
    pub accuracy_percent: f64,
    pub at_max_level: bool,
}

/// Result of a pack import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// The progression & eligibility engine
#[derive(Clone)]
pub struct QuizEngine {
    config: Config,
    clock: RotationClock,
    store: Store,
    cache: ResponseCache,
}

impl QuizEngine {
    /// Open the engine over the configured database path
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_path(&config.db_path())?;
        Self::with_store(config, store)
    }

    /// Build the engine over an existing store (tests, embedded use)
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let clock = RotationClock::new(config.utc_offset_hours, config.reset_hour)?;
        let cache = ResponseCache::new(Duration::from_secs(config.cache_ttl_secs));
        Ok(Self {
            config,
            clock,
            store,
            cache,
        })
    }

    pub fn clock(&self) -> &RotationClock {
        &self.clock
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Today's question for the current rotation window
    pub fn daily_question(&self, identity: &Identity, now: DateTime<Utc>) -> Result<DailyQuestionView> {
        let window = self.clock.window_at(now);
        let pool = self.store.query().active_pool()?;
        let question = select_daily(&pool, &window)?;

        let already_answered = match identity.user_id() {
            Some(user_id) => {
                self.store
                    .query()
                    .daily_attempt_exists(user_id, &question.id, window.start_ms())?
            }
            None => false,
        };

        Ok(DailyQuestionView {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            option_a: question.option_a.clone(),
            option_b: question.option_b.clone(),
            option_c: question.option_c.clone(),
            option_d: question.option_d.clone(),
            difficulty: question.difficulty,
            window_start: window.start_ms(),
            next_reset: window.next_reset().timestamp_millis(),
            already_answered,
        })
    }

    /// Submit an answer. Daily submissions are resolved against the current
    /// window's question and are at-most-once per window per user.
    pub fn submit(
        &self,
        identity: &Identity,
        request: &SubmitRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome> {
        let user = identity.require_user()?;

        if request.daily {
            let window = self.clock.window_at(now);
            let pool = self.store.query().active_pool()?;
            let question = select_daily(&pool, &window)?;
            if let Some(id) = &request.question_id {
                if id != &question.id {
                    return Err(EngineError::Validation(format!(
                        "question {id} is not the daily question for this window"
                    )));
                }
            }
            self.store.recorder().submit(
                user,
                &question.id,
                request.selected_option,
                Some(&window),
                &self.config.rewards,
                now,
            )
        } else {
            let question_id = request.question_id.as_deref().ok_or_else(|| {
                EngineError::Validation("question_id is required for practice submissions".to_string())
            })?;
            self.store.recorder().submit(
                user,
                question_id,
                request.selected_option,
                None,
                &self.config.rewards,
                now,
            )
        }
    }

    /// The requesting user's profile, backfilled on first read
    pub fn profile(&self, identity: &Identity, now: DateTime<Utc>) -> Result<ProfileView> {
        let user = identity.require_user()?;
        let progress = self.store.query().get_progress(
            &user.user_id,
            &self.config.rewards,
            now.timestamp_millis(),
        )?;
        let xp = progress.total_xp as i64;
        Ok(ProfileView {
            xp_to_next_level: LevelThreshold::xp_to_next_level(xp),
            progress_percent: LevelThreshold::progress_to_next_percent(xp),
            accuracy_percent: progress.accuracy_percent(),
            at_max_level: progress.current_level >= LevelThreshold::max_level(),
            progress,
        })
    }

    /// Ranked leaderboard. Email fields survive only on the caller's entry.
    pub fn leaderboard(
        &self,
        metric: Metric,
        filter: TimeFilter,
        limit: Option<usize>,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(self.config.leaderboard_limit)
            .min(self.config.leaderboard_limit);
        let cutoff = filter.cutoff_ms(&self.clock, now);
        let snapshots = self.store.query().leaderboard_snapshots(cutoff)?;
        Ok(leaderboard::rank(snapshots, metric, limit, identity.user_id()))
    }

    /// Leaderboard as a cached JSON payload (the public aggregate surface).
    /// Served up to one cache TTL stale; degrades to an empty board on
    /// storage failure rather than erroring at the caller.
    pub fn leaderboard_cached(
        &self,
        metric: Metric,
        filter: TimeFilter,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> serde_json::Value {
        let key = format!(
            "leaderboard?metric={}&filter={}&caller={}",
            metric.as_str(),
            filter.as_str(),
            identity.user_id().unwrap_or("-")
        );
        self.cache.get_or_compute(
            &key,
            || {
                let entries = self.leaderboard(metric, filter, None, identity, now)?;
                serde_json::to_value(&entries)
                    .map_err(|e| EngineError::Validation(e.to_string()))
            },
            json!([]),
        )
    }

    /// Site-wide aggregates as a cached JSON payload, with a zeroed fallback
    /// when the store is unreachable
    pub fn global_stats(&self) -> serde_json::Value {
        self.cache.get_or_compute(
            "stats/global",
            || {
                let stats = self.store.query().global_stats()?;
                Ok(json!({
                    "total_users": stats.total_users,
                    "total_attempts": stats.total_attempts,
                    "total_correct": stats.total_correct,
                    "active_questions": stats.active_questions,
                    "accuracy_percent": stats.accuracy_percent(),
                }))
            },
            json!({
                "total_users": 0,
                "total_attempts": 0,
                "total_correct": 0,
                "active_questions": 0,
                "accuracy_percent": 0.0,
            }),
        )
    }

    /// Import questions into the pool, skipping ids that already exist
    pub fn import_questions(&self, questions: &[Question]) -> Result<ImportSummary> {
        let recorder = self.store.recorder();
        let mut summary = ImportSummary::default();
        for question in questions {
            if recorder.insert_question(question)? {
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }
        // Pool changes shift aggregates and the daily pick
        self.cache.clear();
        info!(inserted = summary.inserted, skipped = summary.skipped, "question pack imported");
        Ok(summary)
    }

    /// Pull a question out of rotation
    pub fn deactivate_question(&self, question_id: &str) -> Result<()> {
        self.store.recorder().deactivate_question(question_id)?;
        self.cache.clear();
        Ok(())
    }
}
