//! Comment domain entity
//!
//! A read-only snapshot of one of the account's own comments, taken once per
//! poll cycle. The daemon never mutates a snapshot; it only derives decisions
//! from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform identifier for a comment (Reddit base36 id, without the `t1_` prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the authenticated user's comments
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Relative link on the platform, used only for log context
    pub permalink: Option<String>,
}

impl Comment {
    /// Whether the body contains `token` as a plain substring.
    /// An empty token never matches.
    pub fn contains_token(&self, token: &str) -> bool {
        !token.is_empty() && self.body.contains(token)
    }
}
