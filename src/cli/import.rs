//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use quizmill::engine::QuizEngine;
use quizmill::pack;

/// Parse a YAML question pack and load it into the pool
pub fn run(engine: &QuizEngine, file: &Path) -> Result<()> {
    let questions = pack::parse_pack_file(file, Utc::now().timestamp_millis())
        .with_context(|| format!("Failed to load pack: {}", file.display()))?;

    let summary = engine.import_questions(&questions)?;
    println!(
        "Imported {} question(s), skipped {} existing.",
        summary.inserted, summary.skipped
    );
    Ok(())
}
