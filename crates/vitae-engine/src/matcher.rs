//! Threshold-based similarity matching of chunk vectors against a
//! taxonomy embedding snapshot.
//!
//! Vectors on both sides are L2-normalized, so the dot product is the
//! cosine similarity. Scores are clamped to [0, 1]; per entity the best
//! chunk is retained; ties in the final ordering keep taxonomy insertion
//! order, so results are fully deterministic.

use tracing::debug;

use vitae_core::defaults;
use vitae_core::{Chunk, MatchResult};

use crate::cache::{l2_normalize, EmbeddingSnapshot};

/// Per-kind similarity thresholds and the result cap.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum similarity for skill matches (inclusive).
    pub skills_threshold: f32,
    /// Minimum similarity for occupation matches (inclusive).
    pub occupations_threshold: f32,
    /// Maximum results per entity kind.
    pub max_results: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            skills_threshold: defaults::SKILLS_THRESHOLD,
            occupations_threshold: defaults::OCCUPATIONS_THRESHOLD,
            max_results: defaults::MAX_RESULTS,
        }
    }
}

/// Score every chunk vector against every snapshot row and aggregate per
/// entity, keeping the maximum similarity and the chunk that produced it.
///
/// `chunks` and `chunk_vectors` are parallel arrays. Zero chunks yield an
/// empty result. Raising `threshold` can only shrink the result set.
pub fn match_entities(
    chunks: &[Chunk],
    chunk_vectors: &[Vec<f32>],
    snapshot: &EmbeddingSnapshot,
    threshold: f32,
    max_results: usize,
) -> Vec<MatchResult> {
    debug_assert_eq!(chunks.len(), chunk_vectors.len());
    if chunks.is_empty() || snapshot.is_empty() {
        return Vec::new();
    }

    // Best (similarity, chunk index) per snapshot row.
    let mut best: Vec<Option<(f32, usize)>> = vec![None; snapshot.len()];

    for (chunk_idx, vector) in chunk_vectors.iter().enumerate() {
        let query = l2_normalize(vector.clone());
        for (row, entity_vector) in snapshot.rows().iter().enumerate() {
            let similarity = dot(&query, entity_vector).clamp(0.0, 1.0);
            if similarity < threshold {
                continue;
            }
            match best[row] {
                Some((current, _)) if current >= similarity => {}
                _ => best[row] = Some((similarity, chunk_idx)),
            }
        }
    }

    // Collect in taxonomy insertion order, then stable-sort by similarity
    // so equal scores keep that order.
    let mut results: Vec<MatchResult> = best
        .iter()
        .enumerate()
        .filter_map(|(row, entry)| {
            entry.map(|(similarity, chunk_idx)| MatchResult {
                uri: snapshot.uri(row).to_string(),
                name: snapshot.name(row).to_string(),
                similarity,
                chunk: chunks[chunk_idx].clone(),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(max_results);

    debug!(
        subsystem = "matcher",
        entity_kind = %snapshot.kind,
        chunk_count = chunks.len(),
        result_count = results.len(),
        threshold,
        "Similarity matching complete"
    );

    results
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
