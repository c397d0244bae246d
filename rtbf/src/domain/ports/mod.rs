//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod platform;
pub mod rewriter;

pub use platform::PlatformClient;
pub use rewriter::TextRewriter;
