//! Unified error types for the RTBF daemon
//!
//! This module defines error types for each layer:
//! - `ConfigError`: Startup configuration errors (fatal)
//! - `PlatformError`: Reddit API client errors
//! - `RewriteError`: External rewrite (LLM) service errors
//! - `QueueError`: Mutation queue submission errors
//! - `CycleError`: Poll cycle errors surfaced to the scheduler

use thiserror::Error;

/// Configuration errors - rejected at startup before any network activity
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Reddit API client errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - check credentials")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// External rewrite service errors
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),
}

/// Mutation queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Mutation queue worker has stopped")]
    Closed,
}

/// Errors that end a poll cycle early
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to list comments: {0}")]
    Listing(#[from] PlatformError),

    #[error("Failed to enqueue mutation: {0}")]
    Queue(#[from] QueueError),
}
