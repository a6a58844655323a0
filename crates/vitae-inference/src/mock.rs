//! Mock inference backends for deterministic testing.
//!
//! [`MockEmbeddingBackend`] generates stable hash-derived unit vectors so
//! the same text always maps to the same embedding, and lets tests pin
//! exact vectors for chosen texts to steer similarities. No randomness:
//! repeated runs produce identical results.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vitae_core::{ContextAnalyzer, ContextAnnotations, EmbeddingBackend, Error, Result};

/// Deterministic mock embedding backend.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    embedded_texts: Arc<Mutex<Vec<String>>>,
}

struct MockConfig {
    dimension: usize,
    model_id: String,
    /// Lowercased text → pinned vector; takes precedence over hashing.
    pinned: HashMap<String, Vec<f32>>,
    latency: Option<Duration>,
    fail: bool,
}

impl MockEmbeddingBackend {
    /// Create a mock backend with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            config: Arc::new(MockConfig {
                dimension,
                model_id: "mock-embed".to_string(),
                pinned: HashMap::new(),
                latency: None,
                fail: false,
            }),
            embedded_texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn config_mut(&mut self) -> &mut MockConfig {
        Arc::get_mut(&mut self.config).expect("mock configured after sharing")
    }

    /// Override the model identifier (affects cache fingerprints).
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config_mut().model_id = model_id.into();
        self
    }

    /// Pin an exact vector for a text (case-insensitive match). The vector
    /// is L2-normalized on insertion so dot products behave like cosines.
    pub fn with_pinned(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        let normalized = normalize(vector);
        self.config_mut()
            .pinned
            .insert(text.into().to_lowercase(), normalized);
        self
    }

    /// Add simulated latency to every embed call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config_mut().latency = Some(latency);
        self
    }

    /// Make every embed call fail (for error-path tests).
    pub fn with_failure(mut self) -> Self {
        self.config_mut().fail = true;
        self
    }

    /// Every text embedded so far, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.embedded_texts.lock().unwrap().clone()
    }

    /// Number of texts embedded so far.
    pub fn embed_count(&self) -> usize {
        self.embedded_texts.lock().unwrap().len()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let key = text.to_lowercase();
        if let Some(pinned) = self.config.pinned.get(&key) {
            return pinned.clone();
        }

        // Stable SipHash seed; each component comes from re-hashing the
        // running state so the full vector is a function of the text alone.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        let mut state = hasher.finish();
        let mut vector = Vec::with_capacity(self.config.dimension);
        for _ in 0..self.config.dimension {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            // Map to [-1, 1).
            vector.push(((state >> 11) as f32 / (1u64 << 53) as f32) * 2.0 - 1.0);
        }
        normalize(vector)
    }
}

fn normalize(vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.into_iter().map(|v| v / norm).collect()
    } else {
        vector
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if let Some(latency) = self.config.latency {
            tokio::time::sleep(latency).await;
        }
        if self.config.fail {
            return Err(Error::Embedding("mock backend failure".to_string()));
        }

        self.embedded_texts
            .lock()
            .unwrap()
            .extend(texts.iter().cloned());

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

/// Mock context analyzer returning a fixed annotation set.
#[derive(Clone, Default)]
pub struct MockContextAnalyzer {
    annotations: ContextAnnotations,
    delay: Option<Duration>,
    fail: bool,
}

impl MockContextAnalyzer {
    /// Create an analyzer that returns empty annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the annotations to return.
    pub fn with_annotations(mut self, annotations: ContextAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Delay every call (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every call fail.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ContextAnalyzer for MockContextAnalyzer {
    async fn analyze_context(
        &self,
        _text: &str,
        _matched_skills: &[String],
    ) -> Result<ContextAnnotations> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::Inference("mock analyzer failure".to_string()));
        }
        Ok(self.annotations.clone())
    }
}
