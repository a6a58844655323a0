//! End-to-end tests for the analysis pipeline: chunking → embedding →
//! matching → career intelligence, with the deterministic mock backend
//! and a temp-dir embedding cache.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use vitae_core::{
    ContextAnnotations, Essentiality, Occupation, Relation, Skill, SkillAnnotation,
};
use vitae_engine::{Analyzer, AnalyzerConfig, CacheConfig, EmbeddingStore, ExtractOptions};
use vitae_inference::{MockContextAnalyzer, MockEmbeddingBackend};
use vitae_taxonomy::{TaxonomyDataset, TaxonomyGraph};

const DIM: usize = 8;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

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

/// Small taxonomy: a developer role needing Python+Django (SQL optional)
/// and a data-scientist role needing Python, machine learning, and SQL.
fn test_graph() -> Arc<TaxonomyGraph> {
    let mut categories = BTreeMap::new();
    categories.insert(
        "digital".to_string(),
        vec!["skill/python".to_string(), "skill/sql".to_string()],
    );

    Arc::new(
        TaxonomyGraph::build(TaxonomyDataset {
            version: "v1.2.0".to_string(),
            skills: vec![
                skill("skill/python", "Python"),
                skill("skill/django", "Django"),
                skill("skill/ml", "machine learning"),
                skill("skill/sql", "SQL"),
            ],
            occupations: vec![
                occupation("occupation/dev", "software developer"),
                occupation("occupation/ds", "data scientist"),
            ],
            relations: vec![
                relation("occupation/dev", "skill/python", Essentiality::Essential),
                relation("occupation/dev", "skill/django", Essentiality::Essential),
                relation("occupation/dev", "skill/sql", Essentiality::Optional),
                relation("occupation/ds", "skill/python", Essentiality::Essential),
                relation("occupation/ds", "skill/ml", Essentiality::Essential),
                relation("occupation/ds", "skill/sql", Essentiality::Essential),
            ],
            categories,
        })
        .unwrap(),
    )
}

/// Backend pinning each taxonomy label to its own basis vector, so a
/// chunk matches exactly the entity it names.
fn test_backend() -> MockEmbeddingBackend {
    fn basis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        v[i] = 1.0;
        v
    }

    MockEmbeddingBackend::new(DIM)
        .with_pinned("Python", basis(0))
        .with_pinned("Django", basis(1))
        .with_pinned("machine learning", basis(2))
        .with_pinned("SQL", basis(3))
        .with_pinned("software developer", basis(4))
        .with_pinned("data scientist", basis(5))
}

fn analyzer_with(
    backend: MockEmbeddingBackend,
    dir: &std::path::Path,
    config: AnalyzerConfig,
) -> Analyzer {
    Analyzer::new(
        test_graph(),
        Arc::new(backend),
        Arc::new(EmbeddingStore::new(CacheConfig::new(dir))),
        config,
    )
}

#[tokio::test]
async fn test_extract_scenario_python_django_aws_ml() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default());

    let options = ExtractOptions {
        skills_threshold: Some(0.6),
        ..ExtractOptions::default()
    };
    let extraction = analyzer
        .extract("Python, Django, AWS, machine learning", options)
        .await
        .unwrap();

    let names: Vec<&str> = extraction.skills.iter().map(|m| m.name.as_str()).collect();
    assert!(names.contains(&"Python"));
    assert!(names.contains(&"machine learning"));
    for result in &extraction.skills {
        assert!(result.similarity >= 0.6);
    }
    for pair in extraction.skills.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn test_extract_empty_text_returns_empty_without_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let backend = test_backend();
    let counter = backend.clone();
    let analyzer = analyzer_with(backend, dir.path(), AnalyzerConfig::default());

    let extraction = analyzer
        .extract("", ExtractOptions::default())
        .await
        .unwrap();
    assert!(extraction.skills.is_empty());
    assert!(extraction.occupations.is_empty());
    assert_eq!(counter.embed_count(), 0, "embedder must not be called");
}

#[tokio::test]
async fn test_analyze_empty_text_returns_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default());

    let report = analyzer.analyze("", ExtractOptions::default()).await.unwrap();
    assert!(report.extraction.is_empty());
    assert!(report.job_matches.is_empty());
    assert!(report.opportunities.is_empty());
    assert!(report.skill_gaps.demanded_skills.is_empty());
    assert!(!report.partial);
}

#[tokio::test]
async fn test_analyze_produces_matches_and_opportunities() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default());

    let report = analyzer
        .analyze("Python, Django, machine learning", ExtractOptions::default())
        .await
        .unwrap();

    // Developer role: both essentials covered, no optional → 0.7.
    let dev = report
        .job_matches
        .iter()
        .find(|m| m.uri == "occupation/dev")
        .unwrap();
    assert!((dev.coverage.essential - 1.0).abs() < 1e-6);
    assert!((dev.match_score - 0.7).abs() < 1e-6);
    assert!(dev.missing_essential.is_empty());

    // Data-scientist role: 2 of 3 essentials → first in job matches after
    // dev, and an opportunity gated on learning SQL.
    let ds = report
        .job_matches
        .iter()
        .find(|m| m.uri == "occupation/ds")
        .unwrap();
    assert!((ds.coverage.essential - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(ds.missing_essential, vec!["SQL"]);

    assert_eq!(report.opportunities.len(), 1);
    let opportunity = &report.opportunities[0];
    assert_eq!(opportunity.uri, "occupation/ds");
    assert_eq!(opportunity.skills_to_gain, vec!["SQL"]);
    assert_eq!(opportunity.estimated_time, "3-6 months");
    assert_eq!(opportunity.category_focus, vec!["digital"]);

    assert_eq!(report.skill_gaps.demanded_skills, vec![("SQL".to_string(), 1)]);
    assert!(report.context.is_none());
    assert!(!report.partial);
}

#[tokio::test]
async fn test_warm_up_builds_cache_once() {
    let dir = tempfile::tempdir().unwrap();
    let backend = test_backend();
    let counter = backend.clone();
    let analyzer = analyzer_with(backend, dir.path(), AnalyzerConfig::default());

    analyzer.warm_up().await.unwrap();
    // 4 skills + 2 occupations embedded exactly once.
    assert_eq!(counter.embed_count(), 6);

    // Subsequent extraction embeds only its chunks.
    analyzer
        .extract("Python, Django", ExtractOptions::default())
        .await
        .unwrap();
    assert_eq!(counter.embed_count(), 8);
}

#[tokio::test]
async fn test_embedder_failure_is_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockEmbeddingBackend::new(DIM).with_failure();
    let analyzer = analyzer_with(backend, dir.path(), AnalyzerConfig::default());

    let err = analyzer
        .extract("Python, Django", ExtractOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, vitae_core::Error::Embedding(_)));
}

#[tokio::test]
async fn test_context_annotations_attached_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let annotations = ContextAnnotations {
        skills: vec![SkillAnnotation {
            skill_name: "Python".to_string(),
            proficiency: Some("advanced".to_string()),
            years_experience: Some(5.0),
            context: Some("5 years of Python".to_string()),
        }],
        sections: vec![],
    };
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default())
        .with_context_analyzer(Arc::new(
            MockContextAnalyzer::new().with_annotations(annotations),
        ));

    let report = analyzer
        .analyze("Python, Django", ExtractOptions::default())
        .await
        .unwrap();

    let context = report.context.expect("annotations expected");
    assert_eq!(context.skills.len(), 1);
    assert_eq!(context.skills[0].skill_name, "Python");
    assert!(!report.partial);
}

#[tokio::test]
async fn test_context_failure_degrades_to_partial_base_report() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default())
        .with_context_analyzer(Arc::new(MockContextAnalyzer::new().with_failure()));

    let report = analyzer
        .analyze("Python, Django, machine learning", ExtractOptions::default())
        .await
        .unwrap();

    assert!(report.partial);
    assert!(report.context.is_none());
    // The base report is untouched by the collaborator failure.
    assert_eq!(report.extraction.skills.len(), 3);
    assert!(!report.job_matches.is_empty());
}

#[tokio::test]
async fn test_context_timeout_degrades_to_partial_base_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalyzerConfig {
        context_timeout: Duration::from_millis(20),
        ..AnalyzerConfig::default()
    };
    let analyzer = analyzer_with(test_backend(), dir.path(), config).with_context_analyzer(
        Arc::new(MockContextAnalyzer::new().with_delay(Duration::from_millis(500))),
    );

    let report = analyzer
        .analyze("Python, Django", ExtractOptions::default())
        .await
        .unwrap();

    assert!(report.partial);
    assert!(report.context.is_none());
    assert_eq!(report.extraction.skills.len(), 2);
}

#[tokio::test]
async fn test_per_request_threshold_override() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default());

    // An impossible threshold filters everything out.
    let strict = ExtractOptions {
        skills_threshold: Some(1.0),
        occupations_threshold: Some(1.0),
        ..ExtractOptions::default()
    };
    let extraction = analyzer
        .extract("almost python but not quite the same text", strict)
        .await
        .unwrap();
    assert!(extraction.skills.is_empty());
}

#[tokio::test]
async fn test_max_results_override() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_with(test_backend(), dir.path(), AnalyzerConfig::default());

    let options = ExtractOptions {
        max_results: Some(1),
        ..ExtractOptions::default()
    };
    let extraction = analyzer
        .extract("Python, Django, machine learning", options)
        .await
        .unwrap();
    assert_eq!(extraction.skills.len(), 1);
}
