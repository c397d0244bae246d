//! Comment platform port trait
//!
//! Defines the interface for reading and mutating the authenticated user's
//! own comments on the hosting platform.

use async_trait::async_trait;

use crate::domain::entities::{Comment, CommentId};
use crate::error::PlatformError;

/// Port trait for platform API operations
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Verify credentials and return the authenticated username
    async fn authenticate(&self) -> Result<String, PlatformError>;

    /// List up to `limit` of the user's most recent comments, newest first
    async fn list_own_comments(&self, limit: u32) -> Result<Vec<Comment>, PlatformError>;

    /// Permanently delete a comment
    async fn delete(&self, id: &CommentId) -> Result<(), PlatformError>;

    /// Replace a comment's body
    async fn edit(&self, id: &CommentId, text: &str) -> Result<(), PlatformError>;
}
