//! Lifecycle decision and mutation entities

use std::fmt;

use super::comment::CommentId;

/// What to do with a comment this cycle. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Obfuscate,
    Delete,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Skip => write!(f, "skip"),
            Decision::Obfuscate => write!(f, "obfuscate"),
            Decision::Delete => write!(f, "delete"),
        }
    }
}

/// A write operation against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Edit { text: String },
    Delete,
}

/// A pending write bound to a specific comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub comment_id: CommentId,
    pub kind: MutationKind,
}

impl Mutation {
    pub fn edit(comment_id: CommentId, text: impl Into<String>) -> Self {
        Self {
            comment_id,
            kind: MutationKind::Edit { text: text.into() },
        }
    }

    pub fn delete(comment_id: CommentId) -> Self {
        Self {
            comment_id,
            kind: MutationKind::Delete,
        }
    }

    /// Short verb for log lines
    pub fn verb(&self) -> &'static str {
        match self.kind {
            MutationKind::Edit { .. } => "edit",
            MutationKind::Delete => "delete",
        }
    }
}

/// Result of executing a mutation, reported through the optional completion channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Failed(String),
}
