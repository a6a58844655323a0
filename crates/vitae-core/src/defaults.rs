//! Centralized default constants for vitae.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum chunks produced per input document.
pub const MAX_CHUNKS: usize = 100;

/// Minimum fragment length in characters; shorter fragments are noise.
pub const CHUNK_MIN_LEN: usize = 4;

/// Maximum fragment length in characters; longer fragments are unlikely
/// to name a single skill or occupation.
pub const CHUNK_MAX_LEN: usize = 200;

/// Minimum alphabetic characters a fragment must contain.
pub const CHUNK_MIN_ALPHA: usize = 3;

// =============================================================================
// MATCHING THRESHOLDS
// =============================================================================

/// Default similarity threshold for skill matches.
pub const SKILLS_THRESHOLD: f32 = 0.60;

/// Default similarity threshold for occupation matches. Occupation labels
/// are broader than skill labels, so the bar sits slightly lower.
pub const OCCUPATIONS_THRESHOLD: f32 = 0.55;

/// Default maximum results per entity kind for one extraction.
pub const MAX_RESULTS: usize = 10;

// =============================================================================
// CAREER INTELLIGENCE
// =============================================================================

/// Weight of essential-skill coverage in the job match score.
pub const ESSENTIAL_WEIGHT: f32 = 0.7;

/// Weight of optional-skill coverage in the job match score.
pub const OPTIONAL_WEIGHT: f32 = 0.3;

/// Minimum essential coverage for an occupation to appear in job matches.
pub const COVERAGE_FLOOR: f32 = 0.1;

/// Essential coverage at or above which an occupation counts as a current
/// match and is excluded from the opportunity list.
pub const STRONG_MATCH_FLOOR: f32 = 0.8;

/// Maximum missing essential skills for a career opportunity (inclusive).
pub const GAP_THRESHOLD: usize = 5;

/// Gap size at or below which effort is Low.
pub const EFFORT_LOW_MAX_GAP: usize = 2;

/// Gap size at or below which effort is Medium.
pub const EFFORT_MEDIUM_MAX_GAP: usize = 4;

/// Opportunities considered by the skill-gap analysis.
pub const GAP_ANALYSIS_TOP_N: usize = 10;

// =============================================================================
// EMBEDDING CACHE
// =============================================================================

/// Texts per batch sent to the embedding backend during cache builds.
pub const EMBED_BATCH_SIZE: usize = 64;

/// Hex characters kept from the model-id hash for the cache fingerprint.
pub const FINGERPRINT_LEN: usize = 12;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model name.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Default context-analysis model name.
pub const CONTEXT_MODEL: &str = "gemma3:4b";

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for the best-effort context collaborator in seconds. The base
/// report proceeds unaffected when this elapses.
pub const CONTEXT_TIMEOUT_SECS: u64 = 20;
