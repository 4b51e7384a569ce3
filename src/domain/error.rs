//! Engine error taxonomy

/// Errors surfaced at the engine boundary.
///
/// Validation and conflict problems are reported, never coerced into a
/// best-guess result; the only sanctioned clamps are negative XP to zero and
/// an empty daily pool to `Unavailable`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("authentication required")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no daily content available")]
    Unavailable,

    #[error("storage failure: {0}")]
    Internal(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
