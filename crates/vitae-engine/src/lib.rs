//! # vitae-engine
//!
//! The semantic extraction and career-intelligence engine: versioned
//! embedding-cache management, threshold-based similarity matching, and
//! the job-matching / skill-gap / opportunity-prediction computations
//! over the taxonomy graph.

pub mod analyzer;
pub mod cache;
pub mod fingerprint;
pub mod intelligence;
pub mod matcher;

pub use analyzer::{Analyzer, AnalyzerConfig, ExtractOptions};
pub use cache::{CacheConfig, EmbeddingSnapshot, EmbeddingStore, EntityText};
pub use fingerprint::model_fingerprint;
pub use intelligence::IntelligenceConfig;
pub use matcher::{match_entities, MatcherConfig};
