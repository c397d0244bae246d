//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models representing core concepts
//! - `lifecycle`: The retention decision engine
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod lifecycle;
pub mod ports;
