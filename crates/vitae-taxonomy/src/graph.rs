//! The skill↔occupation relationship graph.
//!
//! Built once from a [`TaxonomyDataset`] and read-only afterwards. All
//! per-request computation (matching, career intelligence) runs against a
//! shared reference to this structure with no locking.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use vitae_core::{Essentiality, Occupation, Result, Skill};

use crate::dataset::TaxonomyDataset;

/// Skill requirements of one occupation, split by essentiality.
#[derive(Debug, Clone, Default)]
pub struct RequiredSkills {
    pub essential: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

/// One occupation that uses a given skill.
#[derive(Debug, Clone)]
pub struct OccupationUse {
    pub occupation_uri: String,
    pub essentiality: Essentiality,
}

/// Immutable in-memory model of the taxonomy and its relationship edges.
#[derive(Debug)]
pub struct TaxonomyGraph {
    version: String,
    skills: Vec<Skill>,
    occupations: Vec<Occupation>,
    skill_index: HashMap<String, usize>,
    occupation_index: HashMap<String, usize>,
    /// Aligned with `occupations` (same insertion order).
    requirements: Vec<RequiredSkills>,
    skill_occupations: HashMap<String, Vec<OccupationUse>>,
    skill_categories: HashMap<String, BTreeSet<String>>,
}

impl TaxonomyGraph {
    /// Build the graph from a loaded dataset.
    ///
    /// Relations referencing unknown skill or occupation URIs are skipped
    /// with a warning; published taxonomy releases are known to carry a
    /// handful of dangling rows.
    pub fn build(dataset: TaxonomyDataset) -> Result<Self> {
        let skill_index: HashMap<String, usize> = dataset
            .skills
            .iter()
            .enumerate()
            .map(|(i, s)| (s.uri.clone(), i))
            .collect();
        let occupation_index: HashMap<String, usize> = dataset
            .occupations
            .iter()
            .enumerate()
            .map(|(i, o)| (o.uri.clone(), i))
            .collect();

        let mut requirements = vec![RequiredSkills::default(); dataset.occupations.len()];
        let mut skill_occupations: HashMap<String, Vec<OccupationUse>> = HashMap::new();
        let mut dangling = 0usize;

        for relation in &dataset.relations {
            let Some(&occ_idx) = occupation_index.get(&relation.occupation_uri) else {
                dangling += 1;
                continue;
            };
            if !skill_index.contains_key(&relation.skill_uri) {
                dangling += 1;
                continue;
            }

            let req = &mut requirements[occ_idx];
            match relation.essentiality {
                Essentiality::Essential => req.essential.insert(relation.skill_uri.clone()),
                Essentiality::Optional => req.optional.insert(relation.skill_uri.clone()),
            };

            skill_occupations
                .entry(relation.skill_uri.clone())
                .or_default()
                .push(OccupationUse {
                    occupation_uri: relation.occupation_uri.clone(),
                    essentiality: relation.essentiality,
                });
        }

        if dangling > 0 {
            warn!(
                subsystem = "taxonomy",
                dangling, "Skipped relations referencing unknown URIs"
            );
        }

        let mut skill_categories: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (category, uris) in &dataset.categories {
            for uri in uris {
                if skill_index.contains_key(uri) {
                    skill_categories
                        .entry(uri.clone())
                        .or_default()
                        .insert(category.clone());
                }
            }
        }

        info!(
            subsystem = "taxonomy",
            dataset_version = %dataset.version,
            skills = dataset.skills.len(),
            occupations = dataset.occupations.len(),
            categorized_skills = skill_categories.len(),
            "Taxonomy graph built"
        );

        Ok(Self {
            version: dataset.version,
            skills: dataset.skills,
            occupations: dataset.occupations,
            skill_index,
            occupation_index,
            requirements,
            skill_occupations,
            skill_categories,
        })
    }

    /// Dataset version this graph was built from.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All skills in taxonomy insertion order.
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// All occupations in taxonomy insertion order.
    pub fn occupations(&self) -> &[Occupation] {
        &self.occupations
    }

    /// Look up a skill by URI.
    pub fn skill(&self, uri: &str) -> Option<&Skill> {
        self.skill_index.get(uri).map(|&i| &self.skills[i])
    }

    /// Look up an occupation by URI.
    pub fn occupation(&self, uri: &str) -> Option<&Occupation> {
        self.occupation_index.get(uri).map(|&i| &self.occupations[i])
    }

    /// Canonical skill name for a URI, falling back to the URI itself.
    pub fn skill_name(&self, uri: &str) -> String {
        self.skill(uri)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| uri.to_string())
    }

    /// Essential and optional skill sets required by an occupation.
    ///
    /// Returns `None` for an unknown occupation URI; a known occupation
    /// with no relations yields empty sets.
    pub fn required_skills(&self, occupation_uri: &str) -> Option<&RequiredSkills> {
        self.occupation_index
            .get(occupation_uri)
            .map(|&i| &self.requirements[i])
    }

    /// Occupations that use a skill, with essentiality breakdown.
    pub fn occupations_using(&self, skill_uri: &str) -> &[OccupationUse] {
        self.skill_occupations
            .get(skill_uri)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category tags attached to a skill. Empty for uncategorized skills.
    pub fn categories_of(&self, skill_uri: &str) -> BTreeSet<String> {
        self.skill_categories
            .get(skill_uri)
            .cloned()
            .unwrap_or_default()
    }

    /// Iterate occupations with their requirements in insertion order.
    /// The position doubles as the deterministic tie-break key downstream.
    pub fn occupations_with_requirements(
        &self,
    ) -> impl Iterator<Item = (usize, &Occupation, &RequiredSkills)> {
        self.occupations
            .iter()
            .zip(self.requirements.iter())
            .enumerate()
            .map(|(i, (occ, req))| (i, occ, req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vitae_core::Relation;

    fn skill(uri: &str, name: &str) -> Skill {
        Skill {
            uri: uri.to_string(),
            name: name.to_string(),
            alternatives: vec![],
            description: String::new(),
            skill_type: String::new(),
            reuse_level: String::new(),
        }
    }

    fn occupation(uri: &str, name: &str) -> Occupation {
        Occupation {
            uri: uri.to_string(),
            name: name.to_string(),
            alternatives: vec![],
            description: String::new(),
            isco_group: String::new(),
        }
    }

    fn relation(occ: &str, skill: &str, essentiality: Essentiality) -> Relation {
        Relation {
            occupation_uri: occ.to_string(),
            skill_uri: skill.to_string(),
            essentiality,
        }
    }

    fn test_dataset() -> TaxonomyDataset {
        let mut categories = BTreeMap::new();
        categories.insert(
            "digital".to_string(),
            vec!["skill/python".to_string(), "skill/sql".to_string()],
        );
        categories.insert("transversal".to_string(), vec!["skill/teamwork".to_string()]);

        TaxonomyDataset {
            version: "v1".to_string(),
            skills: vec![
                skill("skill/python", "Python"),
                skill("skill/sql", "SQL"),
                skill("skill/teamwork", "teamwork"),
            ],
            occupations: vec![
                occupation("occupation/dev", "software developer"),
                occupation("occupation/analyst", "data analyst"),
            ],
            relations: vec![
                relation("occupation/dev", "skill/python", Essentiality::Essential),
                relation("occupation/dev", "skill/teamwork", Essentiality::Optional),
                relation("occupation/analyst", "skill/sql", Essentiality::Essential),
                relation("occupation/analyst", "skill/python", Essentiality::Optional),
            ],
            categories,
        }
    }

    #[test]
    fn test_required_skills() {
        let graph = TaxonomyGraph::build(test_dataset()).unwrap();

        let req = graph.required_skills("occupation/dev").unwrap();
        assert!(req.essential.contains("skill/python"));
        assert!(req.optional.contains("skill/teamwork"));
        assert_eq!(req.essential.len(), 1);
        assert_eq!(req.optional.len(), 1);

        assert!(graph.required_skills("occupation/unknown").is_none());
    }

    #[test]
    fn test_occupations_using_with_essentiality() {
        let graph = TaxonomyGraph::build(test_dataset()).unwrap();

        let uses = graph.occupations_using("skill/python");
        assert_eq!(uses.len(), 2);
        let essential: Vec<_> = uses
            .iter()
            .filter(|u| u.essentiality == Essentiality::Essential)
            .collect();
        assert_eq!(essential.len(), 1);
        assert_eq!(essential[0].occupation_uri, "occupation/dev");

        assert!(graph.occupations_using("skill/unknown").is_empty());
    }

    #[test]
    fn test_categories_of() {
        let graph = TaxonomyGraph::build(test_dataset()).unwrap();

        let cats = graph.categories_of("skill/python");
        assert_eq!(cats.len(), 1);
        assert!(cats.contains("digital"));

        assert!(graph.categories_of("skill/unknown").is_empty());
    }

    #[test]
    fn test_dangling_relations_skipped() {
        let mut dataset = test_dataset();
        dataset.relations.push(relation(
            "occupation/ghost",
            "skill/python",
            Essentiality::Essential,
        ));
        dataset.relations.push(relation(
            "occupation/dev",
            "skill/ghost",
            Essentiality::Essential,
        ));

        let graph = TaxonomyGraph::build(dataset).unwrap();
        // The valid requirement set is unchanged.
        let req = graph.required_skills("occupation/dev").unwrap();
        assert_eq!(req.essential.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let graph = TaxonomyGraph::build(test_dataset()).unwrap();
        let order: Vec<_> = graph
            .occupations_with_requirements()
            .map(|(i, occ, _)| (i, occ.uri.as_str()))
            .collect();
        assert_eq!(order, vec![(0, "occupation/dev"), (1, "occupation/analyst")]);
    }

    #[test]
    fn test_skill_name_falls_back_to_uri() {
        let graph = TaxonomyGraph::build(test_dataset()).unwrap();
        assert_eq!(graph.skill_name("skill/python"), "Python");
        assert_eq!(graph.skill_name("skill/ghost"), "skill/ghost");
    }
}
