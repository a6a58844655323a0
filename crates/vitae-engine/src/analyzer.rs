//! Request orchestration: chunking → embedding → matching → intelligence.
//!
//! The [`Analyzer`] owns the read-only taxonomy graph, the embedding
//! backend, and the embedding store, and optionally a best-effort context
//! collaborator. Snapshots build lazily on first need per fingerprint;
//! once built, every request runs against shared immutable state with no
//! locking.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use vitae_core::chunker::chunk;
use vitae_core::defaults;
use vitae_core::{
    AnalysisReport, ContextAnalyzer, EmbeddingBackend, EntityKind, Extraction, Result,
};
use vitae_taxonomy::TaxonomyGraph;

use crate::cache::{EmbeddingSnapshot, EmbeddingStore, EntityText};
use crate::intelligence::{
    analyze_skill_gaps, find_job_matches, predict_opportunities, IntelligenceConfig,
};
use crate::matcher::{match_entities, MatcherConfig};

/// Analyzer configuration: matcher thresholds, intelligence parameters,
/// and the context-collaborator timeout.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub matcher: MatcherConfig,
    pub intelligence: IntelligenceConfig,
    /// Upper bound on the context collaborator call. On expiry the base
    /// report is returned unmodified, flagged as partial.
    pub context_timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            intelligence: IntelligenceConfig::default(),
            context_timeout: Duration::from_secs(defaults::CONTEXT_TIMEOUT_SECS),
        }
    }
}

/// Per-request overrides for extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub skills_threshold: Option<f32>,
    pub occupations_threshold: Option<f32>,
    pub max_results: Option<usize>,
}

/// Sequences the extraction and career-intelligence pipeline.
pub struct Analyzer {
    graph: Arc<TaxonomyGraph>,
    backend: Arc<dyn EmbeddingBackend>,
    store: Arc<EmbeddingStore>,
    context_analyzer: Option<Arc<dyn ContextAnalyzer>>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(
        graph: Arc<TaxonomyGraph>,
        backend: Arc<dyn EmbeddingBackend>,
        store: Arc<EmbeddingStore>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            graph,
            backend,
            store,
            context_analyzer: None,
            config,
        }
    }

    /// Attach the optional context collaborator.
    pub fn with_context_analyzer(mut self, analyzer: Arc<dyn ContextAnalyzer>) -> Self {
        self.context_analyzer = Some(analyzer);
        self
    }

    /// Eagerly build both embedding snapshots. Intended as a startup hook
    /// so the first request does not pay the build cost.
    pub async fn warm_up(&self) -> Result<()> {
        self.snapshot(EntityKind::Skill).await?;
        self.snapshot(EntityKind::Occupation).await?;
        Ok(())
    }

    async fn snapshot(&self, kind: EntityKind) -> Result<Arc<EmbeddingSnapshot>> {
        if let Some(snapshot) =
            self.store
                .try_get(kind, self.backend.model_id(), self.graph.version())
        {
            return Ok(snapshot);
        }

        let entries: Vec<EntityText> = match kind {
            EntityKind::Skill => self
                .graph
                .skills()
                .iter()
                .map(|s| EntityText {
                    uri: s.uri.clone(),
                    name: s.name.clone(),
                    text: s.embedding_text(),
                })
                .collect(),
            EntityKind::Occupation => self
                .graph
                .occupations()
                .iter()
                .map(|o| EntityText {
                    uri: o.uri.clone(),
                    name: o.name.clone(),
                    text: o.embedding_text(),
                })
                .collect(),
        };

        self.store
            .get_or_build(kind, &entries, self.backend.as_ref(), self.graph.version())
            .await
    }

    /// Extract skills and occupations from free-form text.
    ///
    /// Empty or noise-only text short-circuits to an empty extraction
    /// without calling the embedder. Embedder failures surface as a typed
    /// error; nothing partial is persisted.
    pub async fn extract(&self, text: &str, options: ExtractOptions) -> Result<Extraction> {
        let start = Instant::now();
        let chunks = chunk(text);
        if chunks.is_empty() {
            debug!(
                subsystem = "analyzer",
                op = "extract",
                "No meaningful chunks, returning empty extraction"
            );
            return Ok(Extraction::default());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let chunk_vectors = self.backend.embed_texts(&texts).await?;

        let skill_snapshot = self.snapshot(EntityKind::Skill).await?;
        let occupation_snapshot = self.snapshot(EntityKind::Occupation).await?;

        let max_results = options.max_results.unwrap_or(self.config.matcher.max_results);
        let skills = match_entities(
            &chunks,
            &chunk_vectors,
            &skill_snapshot,
            options
                .skills_threshold
                .unwrap_or(self.config.matcher.skills_threshold),
            max_results,
        );
        let occupations = match_entities(
            &chunks,
            &chunk_vectors,
            &occupation_snapshot,
            options
                .occupations_threshold
                .unwrap_or(self.config.matcher.occupations_threshold),
            max_results,
        );

        info!(
            subsystem = "analyzer",
            op = "extract",
            chunk_count = chunks.len(),
            skills = skills.len(),
            occupations = occupations.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(Extraction {
            skills,
            occupations,
        })
    }

    /// Full career-intelligence analysis of one document.
    ///
    /// The optional context collaborator runs under a bounded timeout and
    /// only annotates: it never adds, removes, or rescores matched
    /// entities, and its failure never fails the request.
    pub async fn analyze(&self, text: &str, options: ExtractOptions) -> Result<AnalysisReport> {
        let extraction = self.extract(text, options).await?;

        let user_skills: BTreeSet<String> = extraction
            .skills
            .iter()
            .map(|m| m.uri.clone())
            .collect();

        let job_matches =
            find_job_matches(&user_skills, &self.graph, &self.config.intelligence);
        let opportunities =
            predict_opportunities(&user_skills, &self.graph, &self.config.intelligence);
        let skill_gaps = analyze_skill_gaps(
            &user_skills,
            &opportunities,
            &self.graph,
            &self.config.intelligence,
        );

        let mut report = AnalysisReport {
            extraction,
            job_matches,
            opportunities,
            skill_gaps,
            context: None,
            partial: false,
        };

        if let Some(analyzer) = &self.context_analyzer {
            if !report.extraction.skills.is_empty() {
                let matched_names: Vec<String> = report
                    .extraction
                    .skills
                    .iter()
                    .map(|m| m.name.clone())
                    .collect();

                match tokio::time::timeout(
                    self.config.context_timeout,
                    analyzer.analyze_context(text, &matched_names),
                )
                .await
                {
                    Ok(Ok(annotations)) => report.context = Some(annotations),
                    Ok(Err(e)) => {
                        warn!(
                            subsystem = "analyzer",
                            error = %e,
                            "Context collaborator failed, returning base report"
                        );
                        report.partial = true;
                    }
                    Err(_) => {
                        warn!(
                            subsystem = "analyzer",
                            timeout_secs = self.config.context_timeout.as_secs(),
                            "Context collaborator timed out, returning base report"
                        );
                        report.partial = true;
                    }
                }
            }
        }

        Ok(report)
    }
}
