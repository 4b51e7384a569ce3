//! Stats command implementation

use anyhow::Result;

use quizmill::engine::QuizEngine;

/// Show site-wide aggregates (served from the response cache)
pub fn run(engine: &QuizEngine) -> Result<()> {
    let payload = engine.global_stats();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
