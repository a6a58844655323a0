//! Cache fingerprinting and artifact file naming.
//!
//! The fingerprint is a pure function of the embedding-model identifier;
//! together with the taxonomy dataset version it names exactly one
//! immutable cache artifact per entity kind. Two distinct model ids never
//! share a file name, so switching models can never clobber another
//! model's cache.

use sha2::{Digest, Sha256};

use vitae_core::defaults::FINGERPRINT_LEN;
use vitae_core::EntityKind;

/// Deterministic short fingerprint of an embedding-model identifier.
pub fn model_fingerprint(model_id: &str) -> String {
    let digest = Sha256::digest(model_id.as_bytes());
    hex::encode(digest)[..FINGERPRINT_LEN].to_string()
}

/// File name of the cache artifact for (kind, fingerprint, version).
pub fn cache_file_name(kind: EntityKind, fingerprint: &str, dataset_version: &str) -> String {
    format!(
        "{}_embeddings_{}_{}.json",
        kind, fingerprint, dataset_version
    )
}

/// Detect pre-versioning cache files: either fully unversioned
/// (`skill_embeddings.bin`) or fingerprint-only names without a dataset
/// version (`skill_embeddings_ab12cd34.bin`). These are never loaded,
/// only reported as a migration notice.
pub fn is_legacy_cache_file(file_name: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix("skill_embeddings")
        .or_else(|| file_name.strip_prefix("occupation_embeddings"))
    else {
        return false;
    };

    // Unversioned: "<kind>_embeddings.<ext>"
    if rest == ".bin" || rest == ".json" {
        return true;
    }

    // Fingerprint-only: "<kind>_embeddings_<hex>.<ext>"
    let Some(rest) = rest.strip_prefix('_') else {
        return false;
    };
    let Some((stem, ext)) = rest.rsplit_once('.') else {
        return false;
    };
    if ext != "bin" && ext != "json" {
        return false;
    }
    // Current-format names carry a second `_<version>` segment.
    !stem.contains('_') && stem.len() >= 6 && stem.chars().all(|c| c.is_ascii_hexdigit())
}
