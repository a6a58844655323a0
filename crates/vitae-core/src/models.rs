//! Core data models for vitae.
//!
//! These types are shared across all vitae crates and represent the
//! taxonomy entities, extraction results, and career-intelligence reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// TAXONOMY ENTITIES
// =============================================================================

/// Kind of taxonomy entity. Drives cache-file naming and per-kind
/// similarity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Skill,
    Occupation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skill => write!(f, "skill"),
            Self::Occupation => write!(f, "occupation"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skill" => Ok(Self::Skill),
            "occupation" => Ok(Self::Occupation),
            _ => Err(format!("Invalid entity kind: {}", s)),
        }
    }
}

/// A skill entry in the taxonomy.
///
/// `uri` is the stable canonical identifier; it never changes across
/// dataset versions and is the only field other components key on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Dataset classification, e.g. "skill/competence" or "knowledge".
    #[serde(default)]
    pub skill_type: String,
    /// Dataset reuse level, e.g. "cross-sector". Informational only.
    #[serde(default)]
    pub reuse_level: String,
}

impl Skill {
    /// Text sent to the embedding model for this skill: canonical name,
    /// aliases, and description, so surface forms and semantics both
    /// contribute to the vector.
    pub fn embedding_text(&self) -> String {
        join_embedding_text(&self.name, &self.alternatives, &self.description)
    }
}

/// An occupation entry in the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupation {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// ISCO group code. Informational only.
    #[serde(default)]
    pub isco_group: String,
}

impl Occupation {
    /// Text sent to the embedding model for this occupation.
    pub fn embedding_text(&self) -> String {
        join_embedding_text(&self.name, &self.alternatives, &self.description)
    }
}

fn join_embedding_text(name: &str, alternatives: &[String], description: &str) -> String {
    let mut parts = vec![name.to_string()];
    parts.extend(alternatives.iter().cloned());
    if !description.is_empty() {
        parts.push(description.to_string());
    }
    parts.join(". ")
}

/// Whether a skill is mandatory or supplementary for an occupation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Essentiality {
    Essential,
    Optional,
}

impl std::fmt::Display for Essentiality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Essential => write!(f, "essential"),
            Self::Optional => write!(f, "optional"),
        }
    }
}

impl std::str::FromStr for Essentiality {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "essential" => Ok(Self::Essential),
            "optional" => Ok(Self::Optional),
            _ => Err(format!("Invalid essentiality: {}", s)),
        }
    }
}

/// One occupation↔skill relationship edge. Static, loaded once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub occupation_uri: String,
    pub skill_uri: String,
    pub essentiality: Essentiality,
}

// =============================================================================
// EXTRACTION TYPES
// =============================================================================

/// A text fragment produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Byte offset of the fragment in the cleaned input text.
    pub offset: usize,
}

/// A taxonomy entity matched against input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub uri: String,
    pub name: String,
    /// Cosine similarity, normalized to [0, 1].
    pub similarity: f32,
    /// The chunk that produced the highest similarity for this entity.
    pub chunk: Chunk,
}

/// Skills and occupations extracted from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub skills: Vec<MatchResult>,
    pub occupations: Vec<MatchResult>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.occupations.is_empty()
    }
}

// =============================================================================
// CAREER INTELLIGENCE TYPES
// =============================================================================

/// Fraction of an occupation's required skills present in the user's
/// matched skill set, per essentiality class.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub essential: f32,
    pub optional: f32,
}

/// An occupation the user's current skills already support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub isco_group: String,
    /// Weighted coverage score in [0, 1].
    pub match_score: f32,
    pub matched_skills: Vec<String>,
    pub missing_essential: Vec<String>,
    pub missing_optional: Vec<String>,
    pub coverage: SkillCoverage,
}

/// Learning effort bucket for closing a skill gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A reachable occupation with a manageable skill gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerOpportunity {
    pub uri: String,
    pub name: String,
    /// Essential skills the user would need to acquire. Disjoint from the
    /// user's matched skill set by construction.
    pub skills_to_gain: Vec<String>,
    pub effort: EffortLevel,
    /// Human-readable time estimate, e.g. "3-6 months".
    pub estimated_time: String,
    /// Distinct categories tagging the missing skills, sorted.
    pub category_focus: Vec<String>,
    /// Essential coverage the user already has for this occupation.
    pub current_coverage: f32,
}

/// Aggregate skill-gap statistics across the top career opportunities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillGapAnalysis {
    /// Missing skills ranked by how many opportunities demand them.
    pub demanded_skills: Vec<(String, usize)>,
    /// Skill categories ranked by demand across opportunities.
    pub demanded_categories: Vec<(String, usize)>,
    /// The user's current skill count per category.
    pub current_categories: BTreeMap<String, usize>,
}

// =============================================================================
// CONTEXT ANNOTATIONS (optional collaborator output)
// =============================================================================

/// Contextual annotation for one already-matched skill. Produced by the
/// optional context collaborator; never changes the matched identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAnnotation {
    pub skill_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A CV section boundary proposed by the context collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSection {
    pub heading: String,
    /// Section classification, e.g. "experience", "education", "skills".
    pub kind: String,
    /// Character span of the section body in the input text.
    pub span: (usize, usize),
}

/// Best-effort annotations from the context collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextAnnotations {
    #[serde(default)]
    pub skills: Vec<SkillAnnotation>,
    #[serde(default)]
    pub sections: Vec<CvSection>,
}

// =============================================================================
// ANALYSIS REPORT
// =============================================================================

/// Full career-intelligence report for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub extraction: Extraction,
    pub job_matches: Vec<JobMatch>,
    pub opportunities: Vec<CareerOpportunity>,
    pub skill_gaps: SkillGapAnalysis,
    /// Present only when the context collaborator succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextAnnotations>,
    /// True when the context collaborator was requested but failed or
    /// timed out; the base report is still complete.
    #[serde(default)]
    pub partial: bool,
}
