//! Init command implementation

use anyhow::{Context, Result, bail};

use quizmill::config::Config;
use quizmill::store::Store;

/// Write a default quizmill.toml next to the caller and create the database
pub fn run(config: &Config, force: bool) -> Result<()> {
    let path = std::env::current_dir()?.join("quizmill.toml");
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    Store::with_path(&config.db_path())?;
    println!("Database ready at {}", config.db_path().display());
    Ok(())
}
