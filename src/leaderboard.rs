//! Leaderboard ranking
//!
//! A pure ranker over progress snapshots: sort descending by the chosen
//! metric, break ties by ascending `updated_at` (the earlier achiever ranks
//! higher), then by ascending user id so the order is total and repeated
//! calls over identical snapshots agree position for position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rotation::RotationClock;
use crate::store::ProgressSnapshot;

/// Which counter the board ranks by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    TotalCorrect,
    DailyPoints,
    TotalXp,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalCorrect => "total_correct",
            Self::DailyPoints => "daily_points",
            Self::TotalXp => "total_xp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "total_correct" => Some(Self::TotalCorrect),
            "daily_points" => Some(Self::DailyPoints),
            "total_xp" => Some(Self::TotalXp),
            _ => None,
        }
    }

    fn value(&self, snapshot: &ProgressSnapshot) -> u64 {
        match self {
            Self::TotalCorrect => snapshot.total_correct,
            Self::DailyPoints => snapshot.total_daily_points,
            Self::TotalXp => snapshot.total_xp,
        }
    }
}

/// Optional recency restriction on ranked snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    AllTime,
    ThisWeek,
    ThisMonth,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all_time" => Some(Self::AllTime),
            "this_week" => Some(Self::ThisWeek),
            "this_month" => Some(Self::ThisMonth),
            _ => None,
        }
    }

    /// Lower bound on `updated_at` in ms, None for all-time.
    /// Week starts Monday, month starts the 1st, both at local midnight in
    /// the engine's fixed timezone.
    pub fn cutoff_ms(&self, clock: &RotationClock, now: DateTime<Utc>) -> Option<i64> {
        match self {
            Self::AllTime => None,
            Self::ThisWeek => Some(clock.week_start(now).timestamp_millis()),
            Self::ThisMonth => Some(clock.month_start(now).timestamp_millis()),
        }
    }
}

/// One ranked row, materialized per request and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub user_id: String,
    pub display_name: Option<String>,
    /// Present only on the caller's own entry
    pub email: Option<String>,
    pub metric_value: u64,
    pub updated_at: i64,
}

/// Rank a snapshot set.
///
/// `caller` is the requesting user's id, if any; every other entry has its
/// email nulled out (and all of them are with no caller).
pub fn rank(
    mut snapshots: Vec<ProgressSnapshot>,
    metric: Metric,
    limit: usize,
    caller: Option<&str>,
) -> Vec<LeaderboardEntry> {
    snapshots.sort_by(|a, b| {
        metric
            .value(b)
            .cmp(&metric.value(a))
            .then(a.updated_at.cmp(&b.updated_at))
            .then(a.user_id.cmp(&b.user_id))
    });

    snapshots
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, s)| {
            let own = caller.is_some_and(|c| c == s.user_id);
            let metric_value = metric.value(&s);
            LeaderboardEntry {
                rank: (i + 1) as u32,
                user_id: s.user_id,
                display_name: s.display_name,
                email: if own { s.email } else { None },
                metric_value,
                updated_at: s.updated_at,
            }
        })
        .collect()
}
