//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They record every call and apply mutations to their stored comments so
//! multi-cycle scenarios observe the effect of earlier cycles.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::domain::entities::{Comment, CommentId};
use crate::domain::ports::{PlatformClient, TextRewriter};
use crate::error::{PlatformError, RewriteError};

// ============================================================================
// Mock Platform Client
// ============================================================================

/// A recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Authenticate,
    List(u32),
    Edit(CommentId, String),
    Delete(CommentId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ListingBehavior {
    #[default]
    Succeed,
    Fail,
    Panic,
}

#[derive(Default)]
pub struct MockPlatformClient {
    comments: RwLock<Vec<Comment>>,
    calls: RwLock<Vec<PlatformCall>>,
    failing_ids: HashSet<CommentId>,
    panicking_ids: HashSet<CommentId>,
    listing: ListingBehavior,
}

impl MockPlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with comments, newest first
    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        *self.comments.write().unwrap() = comments;
        self
    }

    /// Edits and deletes for these ids fail with an API error
    pub fn failing_mutations_for(mut self, ids: &[&str]) -> Self {
        self.failing_ids = ids.iter().map(|id| CommentId::from(*id)).collect();
        self
    }

    /// Edits and deletes for these ids panic
    pub fn panicking_mutations_for(mut self, ids: &[&str]) -> Self {
        self.panicking_ids = ids.iter().map(|id| CommentId::from(*id)).collect();
        self
    }

    /// Listing fails with `Unauthorized`
    pub fn failing_listing(mut self) -> Self {
        self.listing = ListingBehavior::Fail;
        self
    }

    /// Listing panics
    pub fn panicking_listing(mut self) -> Self {
        self.listing = ListingBehavior::Panic;
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.read().unwrap().clone()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.write().unwrap().push(call);
    }

    fn check_failure(&self, id: &CommentId) -> Result<(), PlatformError> {
        if self.panicking_ids.contains(id) {
            panic!("mock mutation panicked for {}", id);
        }
        if self.failing_ids.contains(id) {
            Err(PlatformError::Api {
                status: 500,
                message: format!("mock failure for {}", id),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlatformClient for MockPlatformClient {
    async fn authenticate(&self) -> Result<String, PlatformError> {
        self.record(PlatformCall::Authenticate);
        Ok("test-user".to_string())
    }

    async fn list_own_comments(&self, limit: u32) -> Result<Vec<Comment>, PlatformError> {
        self.record(PlatformCall::List(limit));
        match self.listing {
            ListingBehavior::Succeed => Ok(self
                .comments
                .read()
                .unwrap()
                .iter()
                .take(limit as usize)
                .cloned()
                .collect()),
            ListingBehavior::Fail => Err(PlatformError::Unauthorized),
            ListingBehavior::Panic => panic!("mock listing panicked"),
        }
    }

    async fn delete(&self, id: &CommentId) -> Result<(), PlatformError> {
        self.record(PlatformCall::Delete(id.clone()));
        self.check_failure(id)?;
        self.comments.write().unwrap().retain(|c| &c.id != id);
        Ok(())
    }

    async fn edit(&self, id: &CommentId, text: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Edit(id.clone(), text.to_string()));
        self.check_failure(id)?;
        let mut comments = self.comments.write().unwrap();
        match comments.iter_mut().find(|c| &c.id == id) {
            Some(comment) => {
                comment.body = text.to_string();
                Ok(())
            }
            None => Err(PlatformError::Api {
                status: 404,
                message: format!("comment {} not found", id),
            }),
        }
    }
}

// ============================================================================
// Mock Text Rewriter
// ============================================================================

type FailureFactory = Box<dyn Fn() -> RewriteError + Send + Sync>;

pub struct MockTextRewriter {
    response: String,
    failure: Option<FailureFactory>,
    prompts: RwLock<Vec<String>>,
}

impl MockTextRewriter {
    /// Always succeeds with `text`
    pub fn responding(text: &str) -> Self {
        Self {
            response: text.to_string(),
            failure: None,
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Always fails with the error produced by `make_error`
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> RewriteError + Send + Sync + 'static,
    {
        Self {
            response: String::new(),
            failure: Some(Box::new(make_error)),
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl TextRewriter for MockTextRewriter {
    async fn generate(&self, prompt: &str) -> Result<String, RewriteError> {
        self.prompts.write().unwrap().push(prompt.to_string());
        match &self.failure {
            Some(make_error) => Err(make_error()),
            None => Ok(self.response.clone()),
        }
    }
}
