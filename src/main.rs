use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use quizmill::config::Config;
use quizmill::engine::QuizEngine;

mod cli;

#[derive(Parser)]
#[command(name = "quizmill")]
#[command(about = "Quiz progression engine - XP, daily rotations, and leaderboards")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to quizmill.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database (overrides the configured path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Acting user id (the trusted identity assertion)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Acting user's email
    #[arg(long, global = true)]
    email: Option<String>,

    /// Acting user's display name
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default quizmill.toml and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import a YAML question pack into the pool
    Import {
        /// Path to the pack file
        file: PathBuf,
    },

    /// Show today's daily question and the next reset time
    Daily,

    /// Submit an answer (daily by default, or --question for practice)
    Submit {
        /// Chosen option: A, B, C, or D
        option: String,

        /// Practice submission against a specific question id
        #[arg(long)]
        question: Option<String>,
    },

    /// Show the acting user's progress profile
    Profile,

    /// Show the leaderboard
    Leaderboard {
        /// Metric: total_correct, daily_points, or total_xp
        #[arg(long, default_value = "total_correct")]
        metric: String,

        /// Time filter: all_time, this_week, or this_month
        #[arg(long, default_value = "all_time")]
        filter: String,

        /// Maximum entries to show
        #[arg(long)]
        limit: Option<usize>,

        /// Print the cached JSON payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show site-wide aggregate stats (cached)
    Stats,

    /// Pull a question out of rotation
    Deactivate {
        /// Question id
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_dir(&std::env::current_dir()?)?,
    };
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }

    if let Commands::Init { force } = &cli.command {
        return cli::init::run(&config, *force);
    }

    let engine = QuizEngine::new(config)?;
    let identity = cli::identity_from_flags(cli.user, cli.email, cli.name);

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::Import { file } => cli::import::run(&engine, &file),
        Commands::Daily => cli::daily::run(&engine, &identity),
        Commands::Submit { option, question } => {
            cli::submit::run(&engine, &identity, &option, question)
        }
        Commands::Profile => cli::profile::run(&engine, &identity),
        Commands::Leaderboard {
            metric,
            filter,
            limit,
            json,
        } => cli::leaderboard::run(&engine, &identity, &metric, &filter, limit, json),
        Commands::Stats => cli::stats::run(&engine),
        Commands::Deactivate { id } => cli::deactivate::run(&engine, &id),
    }
}
