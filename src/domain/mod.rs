//! Core domain types for quizmill

mod attempt;
mod error;
mod identity;
mod question;

pub use attempt::Attempt;
pub use error::{EngineError, Result};
pub use identity::{Identity, UserIdentity};
pub use question::{AnswerOption, Difficulty, Question};
