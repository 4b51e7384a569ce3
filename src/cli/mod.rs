//! CLI command implementations

pub mod daily;
pub mod deactivate;
pub mod import;
pub mod init;
pub mod leaderboard;
pub mod profile;
pub mod stats;
pub mod submit;

use quizmill::domain::{Identity, UserIdentity};

/// Build the trusted identity assertion from CLI flags
pub fn identity_from_flags(
    user: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
) -> Identity {
    match user {
        Some(user_id) => Identity::User(UserIdentity {
            user_id,
            email,
            display_name,
        }),
        None => Identity::Anonymous,
    }
}

/// Render a ms-since-epoch timestamp for humans
pub fn format_ts(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
