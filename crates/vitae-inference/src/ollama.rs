//! Ollama inference backend implementation.
//!
//! Provides the embedding backend (`/api/embed`) and the best-effort
//! context analyzer (`/api/chat` with JSON format enforcement). The
//! embedding model is treated as a black box: the backend declares its
//! output dimension and validates every response against it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use vitae_core::{
    defaults, ContextAnalyzer, ContextAnnotations, EmbeddingBackend, Error, Result,
};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default embedding dimension for nomic-embed-text.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Ollama inference backend.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    embed_model: String,
    context_model: String,
    dimension: usize,
    embed_timeout_secs: u64,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, embed_model: String, dimension: usize) -> Self {
        let embed_timeout = std::env::var("VITAE_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::EMBED_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(embed_timeout.max(defaults::CONTEXT_TIMEOUT_SECS)))
            .build()
            .unwrap_or_default();

        info!(
            subsystem = "inference",
            component = "ollama",
            model = %embed_model,
            dimension,
            "Initializing Ollama backend: url={}",
            base_url
        );

        Self {
            client,
            base_url,
            embed_model,
            context_model: defaults::CONTEXT_MODEL.to_string(),
            dimension,
            embed_timeout_secs: embed_timeout,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `VITAE_OLLAMA_URL` | `http://127.0.0.1:11434` |
    /// | `VITAE_EMBED_MODEL` | `nomic-embed-text` |
    /// | `VITAE_EMBED_DIM` | `768` |
    /// | `VITAE_CONTEXT_MODEL` | `gemma3:4b` |
    /// | `VITAE_EMBED_TIMEOUT_SECS` | `30` |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("VITAE_OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let embed_model =
            std::env::var("VITAE_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let dimension = std::env::var("VITAE_EMBED_DIM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DIMENSION);

        let mut backend = Self::with_config(base_url, embed_model, dimension);
        if let Ok(model) = std::env::var("VITAE_CONTEXT_MODEL") {
            backend.context_model = model;
        }
        backend
    }

    /// Set the context-analysis model.
    pub fn set_context_model(&mut self, model: String) {
        info!(
            "Switching context model from {} to {}",
            self.context_model, model
        );
        self.context_model = model;
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Chat API message for `/api/chat`.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request payload for the Ollama `/api/chat` endpoint.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    /// Set to `"json"` for guaranteed valid JSON output.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
}

/// Response from the Ollama `/api/chat` endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.embed_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.embed_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(Duration::from_secs(self.embed_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.embeddings.len()
            )));
        }
        for vector in &result.embeddings {
            if vector.len() != self.dimension {
                return Err(Error::Embedding(format!(
                    "Model returned dimension {}, declared {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            duration_ms = elapsed,
            input_count = texts.len(),
            "Embedding complete"
        );
        if elapsed > 10_000 {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }

        Ok(result.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.embed_model
    }
}

const CONTEXT_SYSTEM_PROMPT: &str = "You are a CV analysis assistant. You receive a CV text and \
a list of skills already identified in it. Annotate each listed skill with proficiency \
(beginner/intermediate/advanced/expert), years of experience if stated, and the sentence it \
appears in. Also identify the CV's section boundaries (experience, education, skills, projects, \
certifications). Respond with JSON only: {\"skills\": [{\"skill_name\", \"proficiency\", \
\"years_experience\", \"context\"}], \"sections\": [{\"heading\", \"kind\", \"span\": [start, end]}]}. \
Never add skills that are not in the provided list.";

#[async_trait]
impl ContextAnalyzer for OllamaBackend {
    #[instrument(skip(self, text, matched_skills), fields(subsystem = "inference", component = "ollama", op = "analyze_context", model = %self.context_model, input_count = matched_skills.len()))]
    async fn analyze_context(
        &self,
        text: &str,
        matched_skills: &[String],
    ) -> Result<ContextAnnotations> {
        let prompt = format!(
            "Identified skills: {}\n\nCV text:\n{}",
            matched_skills.join(", "),
            text
        );

        let request = ChatRequest {
            model: self.context_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: CONTEXT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            stream: false,
            format: Some(serde_json::Value::String("json".to_string())),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let annotations: ContextAnnotations = serde_json::from_str(&result.message.content)
            .map_err(|e| Error::Inference(format!("Model returned malformed JSON: {}", e)))?;

        debug!(
            annotated = annotations.skills.len(),
            sections = annotations.sections.len(),
            "Context analysis complete"
        );

        Ok(annotations)
    }
}
