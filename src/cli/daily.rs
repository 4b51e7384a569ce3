//! Daily command implementation

use anyhow::Result;
use chrono::Utc;

use quizmill::domain::{EngineError, Identity};
use quizmill::engine::QuizEngine;

use super::format_ts;

/// Show today's question for the current rotation window
pub fn run(engine: &QuizEngine, identity: &Identity) -> Result<()> {
    let view = match engine.daily_question(identity, Utc::now()) {
        Ok(view) => view,
        Err(EngineError::Unavailable) => {
            println!("No daily question available - the pool is empty.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Daily question [{}]", view.difficulty.as_str());
    println!("  {}", view.prompt);
    println!("    A) {}", view.option_a);
    println!("    B) {}", view.option_b);
    println!("    C) {}", view.option_c);
    println!("    D) {}", view.option_d);
    println!();
    if view.already_answered {
        println!("Already answered in this window.");
    }
    println!("Next reset: {}", format_ts(view.next_reset));
    Ok(())
}
