//! Trusted identity assertions consumed by the engine
//!
//! The engine never authenticates anyone. Callers hand it an already-verified
//! identity (or `Anonymous`) produced by an external identity provider.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// An authenticated user as asserted by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(UserIdentity),
}

impl Identity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(UserIdentity {
            user_id: user_id.into(),
            email: None,
            display_name: None,
        })
    }

    /// User id if signed in
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User(u) => Some(&u.user_id),
        }
    }

    /// Require a signed-in user, rejecting anonymous requests
    pub fn require_user(&self) -> Result<&UserIdentity> {
        match self {
            Self::Anonymous => Err(EngineError::Unauthorized),
            Self::User(u) => Ok(u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_rejected() {
        assert!(matches!(
            Identity::Anonymous.require_user(),
            Err(EngineError::Unauthorized)
        ));
        assert!(Identity::user("u1").require_user().is_ok());
    }
}
