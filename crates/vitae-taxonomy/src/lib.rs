//! # vitae-taxonomy
//!
//! Dataset loading and the immutable skill↔occupation relationship graph.
//!
//! The taxonomy loads once at process start and is read-only thereafter;
//! construction failure (missing or corrupt dataset) is fatal.

pub mod dataset;
pub mod graph;

pub use dataset::TaxonomyDataset;
pub use graph::{OccupationUse, RequiredSkills, TaxonomyGraph};
