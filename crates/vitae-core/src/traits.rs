//! Core traits for vitae abstractions.
//!
//! These traits define the seams to external collaborators (the embedding
//! model, the optional context analyzer, and document-to-text extraction),
//! enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ContextAnnotations;

/// Backend for generating text embeddings.
///
/// The embedding model itself is a black box: vitae only consumes its
/// output vectors, which must all have the declared [`dimension`].
///
/// [`dimension`]: EmbeddingBackend::dimension
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one vector per input text, each of length `dimension()`.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Declared output dimension of the embedding model.
    fn dimension(&self) -> usize;

    /// Model identifier used for cache fingerprinting.
    fn model_id(&self) -> &str;
}

/// Best-effort collaborator that annotates already-matched skills with
/// proficiency, experience, and CV-section context.
///
/// Implementations must never add, remove, or rescore matched entities;
/// they only annotate. Callers bound this with a timeout and fall back to
/// the un-annotated report on failure.
#[async_trait]
pub trait ContextAnalyzer: Send + Sync {
    /// Analyze the input text in the context of the matched skill names.
    async fn analyze_context(
        &self,
        text: &str,
        matched_skills: &[String],
    ) -> Result<ContextAnnotations>;
}

/// Collaborator that turns a document (e.g. a PDF) into plain text.
///
/// Document parsing is out of scope for vitae; this seam lets callers
/// plug in whatever extractor their deployment uses.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Extract plain text from raw document bytes.
    async fn extract_text(&self, data: &[u8]) -> Result<String>;
}
