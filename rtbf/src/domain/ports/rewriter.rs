//! Text rewriter port trait

use async_trait::async_trait;

use crate::error::RewriteError;

/// Port trait for an external text-generation service
#[async_trait]
pub trait TextRewriter: Send + Sync {
    /// Generate text for a fully rendered prompt
    async fn generate(&self, prompt: &str) -> Result<String, RewriteError>;
}
