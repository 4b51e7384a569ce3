//! Profile command implementation

use anyhow::Result;
use chrono::Utc;

use quizmill::domain::Identity;
use quizmill::engine::QuizEngine;

use super::format_ts;

/// Show the acting user's progress profile
pub fn run(engine: &QuizEngine, identity: &Identity) -> Result<()> {
    let profile = engine.profile(identity, Utc::now())?;
    let p = &profile.progress;

    println!("{} - Level {} ({})", p.user_id, p.current_level, p.current_title);
    if profile.at_max_level {
        println!("  {} XP (max level)", p.total_xp);
    } else {
        println!(
            "  {} XP - {} to next level ({:.0}%)",
            p.total_xp, profile.xp_to_next_level, profile.progress_percent
        );
    }
    println!(
        "  Answered {} ({} correct, {:.1}% accuracy)",
        p.total_answered, p.total_correct, profile.accuracy_percent
    );
    println!(
        "  easy {}/{}  medium {}/{}  hard {}/{}",
        p.easy_correct, p.easy_answered,
        p.medium_correct, p.medium_answered,
        p.hard_correct, p.hard_answered
    );
    println!(
        "  Streak {} (best {}), {} daily points",
        p.current_streak, p.longest_streak, p.total_daily_points
    );
    if let Some(last) = p.last_answered_at {
        println!("  Last answered: {}", format_ts(last));
    }
    Ok(())
}
