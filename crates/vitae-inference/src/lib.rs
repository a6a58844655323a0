//! # vitae-inference
//!
//! Inference backends for vitae: the Ollama embedding/context backend and
//! a deterministic mock for tests.
//!
//! Backends implement the [`vitae_core::EmbeddingBackend`] and
//! [`vitae_core::ContextAnalyzer`] traits; everything downstream is
//! backend-agnostic.

pub mod mock;
pub mod ollama;

pub use mock::{MockContextAnalyzer, MockEmbeddingBackend};
pub use ollama::OllamaBackend;
