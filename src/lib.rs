//! quizmill - quiz progression engine
//!
//! The progression and eligibility core of a quiz application: users answer
//! multiple-choice questions, earn XP along a fixed level curve, keep streaks,
//! and compete on leaderboards. Daily content is gated by a rotation window
//! anchored to a fixed local reset hour, enforced at-most-once per window in
//! storage.
//!
//! The engine is a plain service object ([`engine::QuizEngine`]) over a
//! SQLite store; identity is consumed as a trusted assertion, never produced
//! here. The `quizmill` binary wraps the engine's request surfaces as
//! subcommands.

pub mod cache;
pub mod config;
pub mod daily;
pub mod domain;
pub mod engine;
pub mod leaderboard;
pub mod pack;
pub mod progression;
pub mod rotation;
pub mod store;

pub use domain::*;
pub use engine::QuizEngine;
