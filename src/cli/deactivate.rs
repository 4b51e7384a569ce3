//! Deactivate command implementation

use anyhow::Result;

use quizmill::engine::QuizEngine;

/// Pull a question out of rotation, keeping its attempt history
pub fn run(engine: &QuizEngine, question_id: &str) -> Result<()> {
    engine.deactivate_question(question_id)?;
    println!("Question {question_id} deactivated.");
    Ok(())
}
