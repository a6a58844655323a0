//! # vitae-core
//!
//! Core types, traits, and abstractions for the vitae career-intelligence
//! engine.
//!
//! This crate provides the foundational data structures, the text chunker,
//! and the trait definitions that the other vitae crates depend on.

pub mod chunker;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use chunker::chunk;
pub use error::{Error, Result};
pub use models::*;
pub use traits::{ContextAnalyzer, EmbeddingBackend, TextSource};
