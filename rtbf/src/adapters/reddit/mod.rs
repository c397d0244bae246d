//! Reddit adapter
//!
//! Implementation of the platform port against the Reddit OAuth API.

pub mod client;

pub use client::RedditClientImpl;
