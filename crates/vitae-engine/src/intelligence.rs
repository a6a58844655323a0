//! Career-intelligence computations over the taxonomy graph.
//!
//! Three pure functions: job matching, career-opportunity prediction, and
//! skill-gap analysis. All are deterministic for identical inputs and
//! never mutate the graph or the matched-skill set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use vitae_core::defaults;
use vitae_core::{CareerOpportunity, EffortLevel, JobMatch, SkillCoverage, SkillGapAnalysis};
use vitae_taxonomy::TaxonomyGraph;

/// Tunable parameters for the intelligence computations.
///
/// The weighting and bucket boundaries were inconsistently described in
/// prior material, so everything is configuration with documented
/// defaults rather than hard-coded constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    /// Weight of essential-skill coverage in the match score.
    pub essential_weight: f32,
    /// Weight of optional-skill coverage in the match score.
    pub optional_weight: f32,
    /// Occupations with essential coverage below this floor are dropped
    /// from job matches.
    pub coverage_floor: f32,
    /// Essential coverage at or above which an occupation is a current
    /// match and therefore not a growth opportunity.
    pub strong_match_floor: f32,
    /// Maximum missing essential skills for an opportunity (inclusive).
    pub gap_threshold: usize,
    /// Gap size at or below which effort is Low.
    pub effort_low_max_gap: usize,
    /// Gap size at or below which effort is Medium.
    pub effort_medium_max_gap: usize,
    /// Opportunities considered by the skill-gap analysis.
    pub gap_analysis_top_n: usize,
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            essential_weight: defaults::ESSENTIAL_WEIGHT,
            optional_weight: defaults::OPTIONAL_WEIGHT,
            coverage_floor: defaults::COVERAGE_FLOOR,
            strong_match_floor: defaults::STRONG_MATCH_FLOOR,
            gap_threshold: defaults::GAP_THRESHOLD,
            effort_low_max_gap: defaults::EFFORT_LOW_MAX_GAP,
            effort_medium_max_gap: defaults::EFFORT_MEDIUM_MAX_GAP,
            gap_analysis_top_n: defaults::GAP_ANALYSIS_TOP_N,
        }
    }
}

impl IntelligenceConfig {
    fn effort_for_gap(&self, gap: usize) -> (EffortLevel, &'static str) {
        if gap <= self.effort_low_max_gap {
            (EffortLevel::Low, "3-6 months")
        } else if gap <= self.effort_medium_max_gap {
            (EffortLevel::Medium, "6-12 months")
        } else {
            (EffortLevel::High, "1-2 years")
        }
    }
}

/// Find occupations the user's matched skills already support.
///
/// An occupation qualifies when it lists at least one essential skill,
/// the user matches at least one of them, and essential coverage reaches
/// `coverage_floor`. Results are sorted by match score descending;
/// equal scores keep taxonomy insertion order.
pub fn find_job_matches(
    user_skills: &BTreeSet<String>,
    graph: &TaxonomyGraph,
    config: &IntelligenceConfig,
) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = Vec::new();

    for (_, occupation, requirements) in graph.occupations_with_requirements() {
        if requirements.essential.is_empty() {
            continue;
        }

        let matched_essential: BTreeSet<&String> =
            requirements.essential.intersection(user_skills).collect();
        if matched_essential.is_empty() {
            continue;
        }

        let matched_optional: BTreeSet<&String> =
            requirements.optional.intersection(user_skills).collect();

        let coverage = SkillCoverage {
            essential: matched_essential.len() as f32 / requirements.essential.len() as f32,
            optional: if requirements.optional.is_empty() {
                0.0
            } else {
                matched_optional.len() as f32 / requirements.optional.len() as f32
            },
        };

        if coverage.essential < config.coverage_floor {
            continue;
        }

        let match_score = config.essential_weight * coverage.essential
            + config.optional_weight * coverage.optional;

        let matched_skills = skill_names(
            graph,
            matched_essential.into_iter().chain(matched_optional),
        );
        let missing_essential =
            skill_names(graph, requirements.essential.difference(user_skills));
        let missing_optional =
            skill_names(graph, requirements.optional.difference(user_skills));

        matches.push(JobMatch {
            uri: occupation.uri.clone(),
            name: occupation.name.clone(),
            isco_group: occupation.isco_group.clone(),
            match_score,
            matched_skills,
            missing_essential,
            missing_optional,
            coverage,
        });
    }

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        subsystem = "intelligence",
        op = "find_job_matches",
        user_skills = user_skills.len(),
        result_count = matches.len(),
        "Job matching complete"
    );

    matches
}

/// Predict occupations reachable with a manageable skill gap.
///
/// An occupation qualifies when it is not already a strong current match,
/// the user has at least one of its essential skills as a foundation, and
/// the number of missing essential skills is within `gap_threshold`
/// (boundary inclusive). `skills_to_gain` is disjoint from the user's
/// skill set by construction.
pub fn predict_opportunities(
    user_skills: &BTreeSet<String>,
    graph: &TaxonomyGraph,
    config: &IntelligenceConfig,
) -> Vec<CareerOpportunity> {
    let mut opportunities: Vec<CareerOpportunity> = Vec::new();

    for (_, occupation, requirements) in graph.occupations_with_requirements() {
        if requirements.essential.is_empty() {
            continue;
        }

        let matched = requirements.essential.intersection(user_skills).count();
        if matched == 0 {
            continue;
        }

        let missing: Vec<&String> = requirements.essential.difference(user_skills).collect();
        if missing.is_empty() || missing.len() > config.gap_threshold {
            continue;
        }

        let coverage = matched as f32 / requirements.essential.len() as f32;
        if coverage >= config.strong_match_floor {
            continue;
        }

        let (effort, estimated_time) = config.effort_for_gap(missing.len());

        let mut category_focus: BTreeSet<String> = BTreeSet::new();
        for uri in &missing {
            category_focus.extend(graph.categories_of(uri));
        }

        opportunities.push(CareerOpportunity {
            uri: occupation.uri.clone(),
            name: occupation.name.clone(),
            skills_to_gain: skill_names(graph, missing.into_iter()),
            effort,
            estimated_time: estimated_time.to_string(),
            category_focus: category_focus.into_iter().collect(),
            current_coverage: coverage,
        });
    }

    // Fewer skills to gain first; higher existing coverage breaks ties,
    // then URI for full determinism.
    opportunities.sort_by(|a, b| {
        a.skills_to_gain
            .len()
            .cmp(&b.skills_to_gain.len())
            .then_with(|| {
                b.current_coverage
                    .partial_cmp(&a.current_coverage)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.uri.cmp(&b.uri))
    });

    debug!(
        subsystem = "intelligence",
        op = "predict_opportunities",
        user_skills = user_skills.len(),
        result_count = opportunities.len(),
        "Opportunity prediction complete"
    );

    opportunities
}

/// Rank missing skills and categories by demand across the top
/// opportunities, surfacing the highest-leverage skills to acquire.
pub fn analyze_skill_gaps(
    user_skills: &BTreeSet<String>,
    opportunities: &[CareerOpportunity],
    graph: &TaxonomyGraph,
    config: &IntelligenceConfig,
) -> SkillGapAnalysis {
    let mut skill_demand: BTreeMap<String, usize> = BTreeMap::new();
    let mut category_demand: BTreeMap<String, usize> = BTreeMap::new();

    for opportunity in opportunities.iter().take(config.gap_analysis_top_n) {
        for skill in &opportunity.skills_to_gain {
            *skill_demand.entry(skill.clone()).or_insert(0) += 1;
        }
        for category in &opportunity.category_focus {
            *category_demand.entry(category.clone()).or_insert(0) += 1;
        }
    }

    let mut current_categories: BTreeMap<String, usize> = BTreeMap::new();
    for uri in user_skills {
        for category in graph.categories_of(uri) {
            *current_categories.entry(category).or_insert(0) += 1;
        }
    }

    SkillGapAnalysis {
        demanded_skills: rank_by_count(skill_demand),
        demanded_categories: rank_by_count(category_demand),
        current_categories,
    }
}

/// Sort (name, count) pairs by count descending; ties alphabetical.
fn rank_by_count(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn skill_names<'a>(
    graph: &TaxonomyGraph,
    uris: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    uris.map(|uri| graph.skill_name(uri)).collect()
}
