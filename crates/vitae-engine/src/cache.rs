//! Versioned embedding-cache management.
//!
//! One immutable JSON artifact per (entity kind, model fingerprint,
//! dataset version) holds the dense vector matrix and the parallel
//! ordered URI/name arrays. JSON keeps the artifact portable across
//! machines and compute devices: there is no endianness or tensor-layout
//! baggage to migrate.
//!
//! Artifacts are written once via temp-file-and-rename and never modified;
//! a model or dataset change produces a new file name. Loading validates
//! the stored dimension against the active backend's declared dimension;
//! a mismatch is never silently tolerated and always forces regeneration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use vitae_core::defaults::EMBED_BATCH_SIZE;
use vitae_core::{EmbeddingBackend, EntityKind, Error, Result};

use crate::fingerprint::{cache_file_name, is_legacy_cache_file, model_fingerprint};

/// One taxonomy entity's identity and the text to embed for it.
#[derive(Debug, Clone)]
pub struct EntityText {
    pub uri: String,
    pub name: String,
    pub text: String,
}

/// Persisted cache artifact. The `uris`/`names` arrays are aligned 1:1
/// with `vectors`; every vector has length `dimension`.
#[derive(Debug, Serialize, Deserialize)]
struct CacheArtifact {
    model_id: String,
    model_fingerprint: String,
    dataset_version: String,
    dimension: usize,
    generated_at: DateTime<Utc>,
    uris: Vec<String>,
    names: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl CacheArtifact {
    fn is_aligned(&self) -> bool {
        self.uris.len() == self.vectors.len()
            && self.names.len() == self.vectors.len()
            && self.vectors.iter().all(|v| v.len() == self.dimension)
    }
}

/// Immutable in-memory embedding matrix for one entity kind.
///
/// Rows are L2-normalized at construction so the matcher's dot products
/// are cosine similarities. Shared across requests via `Arc`; replaced,
/// never mutated, when the fingerprint changes.
#[derive(Debug)]
pub struct EmbeddingSnapshot {
    pub kind: EntityKind,
    pub model_id: String,
    pub fingerprint: String,
    pub dataset_version: String,
    pub dimension: usize,
    uris: Vec<String>,
    names: Vec<String>,
    matrix: Vec<Vec<f32>>,
}

impl EmbeddingSnapshot {
    /// Number of entities in the snapshot.
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Entity URI at a matrix row (taxonomy insertion order).
    pub fn uri(&self, row: usize) -> &str {
        &self.uris[row]
    }

    /// Canonical entity name at a matrix row.
    pub fn name(&self, row: usize) -> &str {
        &self.names[row]
    }

    /// The L2-normalized vector matrix, row-aligned with `uri`/`name`.
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.matrix
    }

    fn from_artifact(kind: EntityKind, artifact: CacheArtifact) -> Self {
        let matrix = artifact.vectors.into_iter().map(l2_normalize).collect();
        Self {
            kind,
            model_id: artifact.model_id,
            fingerprint: artifact.model_fingerprint,
            dataset_version: artifact.dataset_version,
            dimension: artifact.dimension,
            uris: artifact.uris,
            names: artifact.names,
            matrix,
        }
    }
}

/// Normalize a vector to unit length. Zero vectors pass through unchanged
/// so they simply never exceed a similarity threshold.
pub(crate) fn l2_normalize(vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.into_iter().map(|v| v / norm).collect()
    } else {
        vector
    }
}

/// Configuration for the embedding store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding cache artifacts. Created on first build.
    pub dir: PathBuf,
    /// Texts per embedding request during cache builds.
    pub batch_size: usize,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            batch_size: EMBED_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Manages embedding snapshots keyed by (kind, fingerprint, version).
///
/// At most one build per key is ever in flight: concurrent callers of
/// [`get_or_build`] join the same build instead of triggering duplicate
/// regeneration, and [`try_get`] offers a non-blocking "not ready" path.
///
/// [`get_or_build`]: EmbeddingStore::get_or_build
/// [`try_get`]: EmbeddingStore::try_get
pub struct EmbeddingStore {
    config: CacheConfig,
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<EmbeddingSnapshot>>>>>,
}

impl EmbeddingStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            cells: Mutex::new(HashMap::new()),
        }
    }

    fn cell_for(&self, key: &str) -> Arc<OnceCell<Arc<EmbeddingSnapshot>>> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(key.to_string()).or_default().clone()
    }

    /// Return the snapshot for this key, loading or building it if needed.
    ///
    /// `entries` supply the entity order and embedding texts used only
    /// when a build is required. The returned snapshot is shared; callers
    /// hold it by `Arc` for the duration of a request.
    pub async fn get_or_build(
        &self,
        kind: EntityKind,
        entries: &[EntityText],
        backend: &dyn EmbeddingBackend,
        dataset_version: &str,
    ) -> Result<Arc<EmbeddingSnapshot>> {
        let fingerprint = model_fingerprint(backend.model_id());
        let key = snapshot_key(kind, &fingerprint, dataset_version);
        let cell = self.cell_for(&key);

        cell.get_or_try_init(|| async {
            self.load_or_build(kind, &fingerprint, entries, backend, dataset_version)
                .await
                .map(Arc::new)
        })
        .await
        .map(Arc::clone)
    }

    /// Non-blocking lookup: `None` means "not ready" (never built, or a
    /// build is still in flight).
    pub fn try_get(
        &self,
        kind: EntityKind,
        model_id: &str,
        dataset_version: &str,
    ) -> Option<Arc<EmbeddingSnapshot>> {
        let fingerprint = model_fingerprint(model_id);
        let key = snapshot_key(kind, &fingerprint, dataset_version);
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.get(&key).and_then(|cell| cell.get().cloned())
    }

    async fn load_or_build(
        &self,
        kind: EntityKind,
        fingerprint: &str,
        entries: &[EntityText],
        backend: &dyn EmbeddingBackend,
        dataset_version: &str,
    ) -> Result<EmbeddingSnapshot> {
        self.report_legacy_files().await;

        let path = self
            .config
            .dir
            .join(cache_file_name(kind, fingerprint, dataset_version));

        if let Some(snapshot) = self
            .try_load(kind, &path, backend.dimension(), entries.len())
            .await
        {
            return Ok(snapshot);
        }

        self.build(kind, fingerprint, entries, backend, dataset_version, &path)
            .await
    }

    /// Load an existing artifact, returning `None` when it is absent or
    /// unusable (dimension mismatch, misaligned arrays, parse failure);
    /// every `None` leads to regeneration.
    async fn try_load(
        &self,
        kind: EntityKind,
        path: &Path,
        expected_dimension: usize,
        expected_len: usize,
    ) -> Option<EmbeddingSnapshot> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        let artifact: CacheArtifact = match serde_json::from_str(&raw) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(
                    subsystem = "cache",
                    entity_kind = %kind,
                    error = %e,
                    "Cache artifact unparseable, regenerating"
                );
                return None;
            }
        };

        if artifact.dimension != expected_dimension {
            warn!(
                subsystem = "cache",
                entity_kind = %kind,
                cached_dimension = artifact.dimension,
                model_dimension = expected_dimension,
                "Embedding dimension mismatch between cache and active model, regenerating"
            );
            return None;
        }

        if !artifact.is_aligned() || artifact.uris.len() != expected_len {
            warn!(
                subsystem = "cache",
                entity_kind = %kind,
                "Cache artifact misaligned with taxonomy, regenerating"
            );
            return None;
        }

        info!(
            subsystem = "cache",
            entity_kind = %kind,
            fingerprint = %artifact.model_fingerprint,
            dataset_version = %artifact.dataset_version,
            dimension = artifact.dimension,
            entities = artifact.uris.len(),
            "Loaded embedding cache"
        );

        Some(EmbeddingSnapshot::from_artifact(kind, artifact))
    }

    /// Embed every entity text batch by batch and persist the artifact.
    async fn build(
        &self,
        kind: EntityKind,
        fingerprint: &str,
        entries: &[EntityText],
        backend: &dyn EmbeddingBackend,
        dataset_version: &str,
        path: &Path,
    ) -> Result<EmbeddingSnapshot> {
        let start = Instant::now();
        info!(
            subsystem = "cache",
            entity_kind = %kind,
            fingerprint = %fingerprint,
            dataset_version = %dataset_version,
            model = backend.model_id(),
            entities = entries.len(),
            "Building embedding cache"
        );

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(entries.len());
        for batch in entries.chunks(self.config.batch_size) {
            let texts: Vec<String> = batch.iter().map(|e| e.text.clone()).collect();
            let batch_vectors = backend.embed_texts(&texts).await?;
            if batch_vectors.len() != texts.len() {
                return Err(Error::Embedding(format!(
                    "Backend returned {} vectors for {} texts",
                    batch_vectors.len(),
                    texts.len()
                )));
            }
            for vector in &batch_vectors {
                if vector.len() != backend.dimension() {
                    return Err(Error::Embedding(format!(
                        "Backend returned dimension {}, declared {}",
                        vector.len(),
                        backend.dimension()
                    )));
                }
            }
            vectors.extend(batch_vectors);
            debug!(
                subsystem = "cache",
                entity_kind = %kind,
                progress = vectors.len(),
                total = entries.len(),
                "Cache build progress"
            );
        }

        let artifact = CacheArtifact {
            model_id: backend.model_id().to_string(),
            model_fingerprint: fingerprint.to_string(),
            dataset_version: dataset_version.to_string(),
            dimension: backend.dimension(),
            generated_at: Utc::now(),
            uris: entries.iter().map(|e| e.uri.clone()).collect(),
            names: entries.iter().map(|e| e.name.clone()).collect(),
            vectors,
        };

        self.persist(&artifact, path).await?;

        info!(
            subsystem = "cache",
            entity_kind = %kind,
            duration_ms = start.elapsed().as_millis() as u64,
            entities = entries.len(),
            "Embedding cache built"
        );

        Ok(EmbeddingSnapshot::from_artifact(kind, artifact))
    }

    /// Write via temp file + rename so a crash mid-write never leaves a
    /// partial artifact behind the final name.
    async fn persist(&self, artifact: &CacheArtifact, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|e| Error::Cache(format!("cannot create cache dir: {}", e)))?;

        let json = serde_json::to_string(artifact)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Cache(format!("cannot write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| Error::Cache(format!("cannot finalize {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Log a one-line migration notice for pre-versioning cache files.
    /// They are never loaded and never deleted.
    async fn report_legacy_files(&self) {
        let mut dir = match tokio::fs::read_dir(&self.config.dir).await {
            Ok(dir) => dir,
            Err(_) => return,
        };
        let mut legacy = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_legacy_cache_file(&name) {
                legacy.push(name);
            }
        }
        if !legacy.is_empty() {
            warn!(
                subsystem = "cache",
                files = ?legacy,
                "Ignoring legacy cache files without dataset versioning; new versioned artifacts will be generated"
            );
        }
    }
}

fn snapshot_key(kind: EntityKind, fingerprint: &str, dataset_version: &str) -> String {
    format!("{}:{}:{}", kind, fingerprint, dataset_version)
}
