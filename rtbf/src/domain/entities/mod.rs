//! Domain entities
//!
//! Pure domain models representing core concepts.

pub mod comment;
pub mod decision;

pub use comment::{Comment, CommentId};
pub use decision::{Decision, Mutation, MutationKind, MutationOutcome};
