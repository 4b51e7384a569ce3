//! Leaderboard command implementation

use anyhow::{Result, bail};
use chrono::Utc;

use quizmill::domain::Identity;
use quizmill::engine::QuizEngine;
use quizmill::leaderboard::{Metric, TimeFilter};

/// Show the ranked leaderboard
pub fn run(
    engine: &QuizEngine,
    identity: &Identity,
    metric: &str,
    filter: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let Some(metric) = Metric::from_str(metric) else {
        bail!("Unknown metric '{metric}' (expected total_correct, daily_points, or total_xp)");
    };
    let Some(filter) = TimeFilter::from_str(filter) else {
        bail!("Unknown filter '{filter}' (expected all_time, this_week, or this_month)");
    };

    if json {
        let payload = engine.leaderboard_cached(metric, filter, identity, Utc::now());
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let entries = engine.leaderboard(metric, filter, limit, identity, Utc::now())?;
    if entries.is_empty() {
        println!("No entries.");
        return Ok(());
    }

    println!("{} ({})", metric.as_str(), filter.as_str());
    for entry in &entries {
        let name = entry
            .display_name
            .as_deref()
            .unwrap_or(entry.user_id.as_str());
        println!("  {:>3}. {:<24} {}", entry.rank, name, entry.metric_value);
    }
    Ok(())
}
