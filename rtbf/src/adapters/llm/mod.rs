//! LLM adapter
//!
//! OpenAI-compatible chat-completions client used by the rewrite strategy.

pub mod client;

pub use client::LlmClient;
