//! Question pack parser
//!
//! Packs are YAML files holding a batch of questions for import:
//!
//! ```yaml
//! questions:
//!   - prompt: "Which keyword declares an immutable binding?"
//!     option_a: "let"
//!     option_b: "mut"
//!     option_c: "static"
//!     option_d: "const"
//!     correct_option: A
//!     difficulty: easy
//!     explanation: "Bindings are immutable unless marked mut."
//! ```
//!
//! Ids are optional; a missing id gets a fresh UUID at parse time.

use std::path::Path;

use serde::Deserialize;

use crate::domain::{AnswerOption, Difficulty, Question};

/// Error type for pack parsing
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid question {index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("Pack contains no questions")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct PackFile {
    questions: Vec<PackQuestion>,
}

#[derive(Debug, Deserialize)]
struct PackQuestion {
    #[serde(default)]
    id: Option<String>,
    prompt: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_option: String,
    difficulty: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Parse a pack file from a path
pub fn parse_pack_file(path: &Path, now_ms: i64) -> Result<Vec<Question>, PackError> {
    let content = std::fs::read_to_string(path)?;
    parse_pack(&content, now_ms)
}

/// Parse pack content from a string
pub fn parse_pack(content: &str, now_ms: i64) -> Result<Vec<Question>, PackError> {
    let pack: PackFile = serde_yaml::from_str(content)?;
    if pack.questions.is_empty() {
        return Err(PackError::Empty);
    }

    pack.questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| validate_question(index, q, now_ms))
        .collect()
}

fn validate_question(index: usize, q: PackQuestion, now_ms: i64) -> Result<Question, PackError> {
    let invalid = |reason: String| PackError::InvalidQuestion { index, reason };

    if q.prompt.trim().is_empty() {
        return Err(invalid("empty prompt".to_string()));
    }
    for (name, text) in [
        ("option_a", &q.option_a),
        ("option_b", &q.option_b),
        ("option_c", &q.option_c),
        ("option_d", &q.option_d),
    ] {
        if text.trim().is_empty() {
            return Err(invalid(format!("empty {name}")));
        }
    }
    let correct_option = AnswerOption::from_str(&q.correct_option)
        .ok_or_else(|| invalid(format!("unknown option key: {}", q.correct_option)))?;
    let difficulty = Difficulty::from_str(&q.difficulty)
        .ok_or_else(|| invalid(format!("unknown difficulty: {}", q.difficulty)))?;

    let id = match q.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => uuid::Uuid::new_v4().to_string(),
    };

    Ok(Question {
        id,
        prompt: q.prompt,
        option_a: q.option_a,
        option_b: q.option_b,
        option_c: q.option_c,
        option_d: q.option_d,
        correct_option,
        difficulty,
        explanation: q.explanation,
        active: q.active,
        created_at: now_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
questions:
  - id: q-let
    prompt: "Which keyword declares an immutable binding?"
    option_a: "let"
    option_b: "mut"
    option_c: "static"
    option_d: "const"
    correct_option: A
    difficulty: easy
  - prompt: "What does ? do on a Result?"
    option_a: "panics"
    option_b: "propagates the error"
    option_c: "ignores the error"
    option_d: "retries"
    correct_option: b
    difficulty: medium
    explanation: "It returns early with the error."
"#;

    #[test]
    fn test_parses_valid_pack() {
        let questions = parse_pack(VALID, 1000).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "q-let");
        assert_eq!(questions[0].correct_option, AnswerOption::A);
        assert_eq!(questions[1].difficulty, Difficulty::Medium);
        // Missing id is filled with a UUID
        assert!(!questions[1].id.is_empty());
        assert!(questions.iter().all(|q| q.active && q.created_at == 1000));
    }

    #[test]
    fn test_rejects_bad_option_key() {
        let content = VALID.replace("correct_option: A", "correct_option: X");
        assert!(matches!(
            parse_pack(&content, 0),
            Err(PackError::InvalidQuestion { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_difficulty() {
        let content = VALID.replace("difficulty: easy", "difficulty: brutal");
        assert!(matches!(
            parse_pack(&content, 0),
            Err(PackError::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_prompt_and_empty_pack() {
        let content = VALID.replace("Which keyword declares an immutable binding?", "  ");
        assert!(matches!(
            parse_pack(&content, 0),
            Err(PackError::InvalidQuestion { .. })
        ));
        assert!(matches!(
            parse_pack("questions: []", 0),
            Err(PackError::Empty)
        ));
    }
}
