//! skillbridge/crates/domains/src/lib.rs
//!
//! Entities, port traits and the error type shared by every SkillBridge crate.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
