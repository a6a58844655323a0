//! Structured logging schema and field name constants for vitae.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, cache builds), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (chunks, match hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "taxonomy", "cache", "matcher", "intelligence", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "chunker", "embedding_store", "ollama", "analyzer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "extract", "analyze", "embed_texts", "get_or_build"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Taxonomy entity kind ("skill" / "occupation").
pub const ENTITY_KIND: &str = "entity_kind";

/// Cache fingerprint for the active model.
pub const FINGERPRINT: &str = "fingerprint";

/// Taxonomy dataset version.
pub const DATASET_VERSION: &str = "dataset_version";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of chunks produced from one document.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of input texts sent to the embedding model.
pub const INPUT_COUNT: &str = "input_count";

/// Number of results returned by a match or intelligence pass.
pub const RESULT_COUNT: &str = "result_count";

/// Embedding vector dimension.
pub const DIMENSION: &str = "dimension";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
