//! Taxonomy dataset loading.
//!
//! A dataset directory holds four JSON files: `skills.json`,
//! `occupations.json`, `relations.json`, and `categories.json`, plus the
//! version string the embedding cache is keyed by. A missing or corrupt
//! file is fatal: the engine cannot run without its taxonomy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use vitae_core::{Error, Occupation, Relation, Result, Skill};

/// File name for the skill entries.
pub const SKILLS_FILE: &str = "skills.json";

/// File name for the occupation entries.
pub const OCCUPATIONS_FILE: &str = "occupations.json";

/// File name for the occupation↔skill relationship edges.
pub const RELATIONS_FILE: &str = "relations.json";

/// File name for the category → skill URI collections.
pub const CATEGORIES_FILE: &str = "categories.json";

/// Raw taxonomy dataset as loaded from disk, before graph construction.
#[derive(Debug, Clone)]
pub struct TaxonomyDataset {
    pub version: String,
    pub skills: Vec<Skill>,
    pub occupations: Vec<Occupation>,
    pub relations: Vec<Relation>,
    /// Category tag → skill URIs carrying that tag.
    pub categories: BTreeMap<String, Vec<String>>,
}

impl TaxonomyDataset {
    /// Load a dataset from a directory.
    ///
    /// `version` identifies the dataset release (e.g. `"v1.2.0"`) and
    /// becomes part of every embedding-cache fingerprint.
    pub fn load(dir: impl AsRef<Path>, version: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref();
        let version = version.into();

        let skills: Vec<Skill> = read_json(&dir.join(SKILLS_FILE))?;
        let occupations: Vec<Occupation> = read_json(&dir.join(OCCUPATIONS_FILE))?;
        let relations: Vec<Relation> = read_json(&dir.join(RELATIONS_FILE))?;
        let categories: BTreeMap<String, Vec<String>> = read_json(&dir.join(CATEGORIES_FILE))?;

        if skills.is_empty() {
            return Err(Error::Taxonomy(format!(
                "{} contains no skills",
                dir.join(SKILLS_FILE).display()
            )));
        }
        if occupations.is_empty() {
            return Err(Error::Taxonomy(format!(
                "{} contains no occupations",
                dir.join(OCCUPATIONS_FILE).display()
            )));
        }

        info!(
            subsystem = "taxonomy",
            dataset_version = %version,
            skills = skills.len(),
            occupations = occupations.len(),
            relations = relations.len(),
            categories = categories.len(),
            "Taxonomy dataset loaded"
        );

        Ok(Self {
            version,
            skills,
            occupations,
            relations,
            categories,
        })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Taxonomy(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Taxonomy(format!("cannot parse {}: {}", path.display(), e)))
}
