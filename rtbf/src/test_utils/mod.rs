//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//! Mocks are in-memory and record every call so tests can assert on the
//! exact sequence of platform operations.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
