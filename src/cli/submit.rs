//! Submit command implementation

use anyhow::{Result, bail};
use chrono::Utc;

use quizmill::domain::{AnswerOption, Identity};
use quizmill::engine::{QuizEngine, SubmitRequest};

/// Submit an answer: daily by default, practice when --question is given
pub fn run(
    engine: &QuizEngine,
    identity: &Identity,
    option: &str,
    question: Option<String>,
) -> Result<()> {
    let Some(selected_option) = AnswerOption::from_str(option) else {
        bail!("Unknown option '{option}' (expected A, B, C, or D)");
    };

    let request = SubmitRequest {
        daily: question.is_none(),
        question_id: question,
        selected_option,
    };
    let outcome = engine.submit(identity, &request, Utc::now())?;

    if outcome.is_correct {
        println!("Correct! +{} XP", outcome.awarded_xp);
    } else {
        println!(
            "Incorrect - the answer was {}.",
            outcome.correct_option.as_str()
        );
    }
    if let Some(explanation) = &outcome.explanation {
        println!("  {}", explanation);
    }
    println!(
        "Level {} ({}) - {} XP total, streak {}",
        outcome.level, outcome.title, outcome.total_xp, outcome.current_streak
    );
    if outcome.leveled_up {
        println!("Level up!");
    }
    Ok(())
}
