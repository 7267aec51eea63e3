//! End-to-end graph construction.

use crate::abstraction::{AbstractionRefiner, estimate_batch};
use crate::graph::{build_nodes, build_similarity_edges, build_timeline_edges};
use crate::layout::{LayoutMode, grid_layout, polar_edges, polar_layout};
use crate::similarity::{EmbeddingCache, SimilarityMatrix, SimilarityScorer};
use crate::CoreError;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trailmap_config::TrailmapConfig;
use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionEstimation, ConfirmedRecord, EmbeddingProvider, LearningGraph, RecordId,
    SimilarityScore, TextClassifier,
};

/// Wires estimation, similarity, graph building and layout together.
///
/// The ontology and config are fixed at construction. Both external
/// capabilities are optional; without them every stage runs on local
/// signals only.
#[derive(Clone)]
pub struct GraphPipeline {
    ontology: Arc<Ontology>,
    config: TrailmapConfig,
    classifier: Option<Arc<dyn TextClassifier>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl GraphPipeline {
    pub fn new(ontology: Arc<Ontology>, config: TrailmapConfig) -> Self {
        Self {
            ontology,
            config,
            classifier: None,
            embedder: None,
        }
    }

    /// Validate `config` and load the ontology it names, or the built-in one.
    pub fn from_config(config: TrailmapConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let ontology = match config.ontology.path.as_deref() {
            Some(path) => Ontology::load_from_path(path)?,
            None => Ontology::builtin(),
        };
        Ok(Self::new(Arc::new(ontology), config))
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn config(&self) -> &TrailmapConfig {
        &self.config
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.providers.request_delay_ms)
    }

    /// Abstraction estimates for every record.
    ///
    /// The classifier is consulted only when refinement is enabled.
    pub async fn estimate(
        &self,
        records: &[ConfirmedRecord],
    ) -> HashMap<RecordId, AbstractionEstimation> {
        let estimates = estimate_batch(&self.ontology, records);
        match &self.classifier {
            Some(classifier) if self.config.abstraction.refine_with_classifier => {
                let refiner = AbstractionRefiner::new(
                    Arc::clone(classifier),
                    self.config.abstraction.merge_margin,
                    self.request_delay(),
                );
                refiner.refine_batch(records, estimates).await
            }
            _ => estimates,
        }
    }

    /// Pairwise matrix over `records`, prefetching embeddings into `cache`.
    ///
    /// Embeddings are fetched on the caller's task; the parallel scoring
    /// pass runs on the blocking pool.
    pub async fn similarity_matrix(
        &self,
        records: &[ConfirmedRecord],
        estimates: &HashMap<RecordId, AbstractionEstimation>,
        cache: &mut EmbeddingCache,
    ) -> Result<SimilarityMatrix, CoreError> {
        if let Some(embedder) = self.embedder.as_deref() {
            cache.prefetch(embedder, records, self.request_delay()).await;
        }
        let ontology = Arc::clone(&self.ontology);
        let records = records.to_vec();
        let estimates = estimates.clone();
        let similarity = self.config.similarity.clone();
        let snapshot = cache.clone();
        tokio::task::spawn_blocking(move || {
            let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &similarity);
            SimilarityMatrix::build(&scorer, &snapshot)
        })
        .await
        .map_err(|err| CoreError::Task(format!("similarity matrix task failed: {err}")))?
    }

    /// Build and lay out the learning graph.
    ///
    /// Grid mode emits timeline and similarity edges; polar mode emits
    /// ring-constrained similarity edges between placed nodes.
    pub async fn build(
        &self,
        records: &[ConfirmedRecord],
        mode: &LayoutMode,
        cache: &mut EmbeddingCache,
    ) -> Result<LearningGraph, CoreError> {
        if records.is_empty() {
            debug!("no records; returning empty graph");
            return Ok(LearningGraph::default());
        }
        let estimates = self.estimate(records).await;
        let nodes = build_nodes(&self.ontology, records, &estimates);
        let matrix = self.similarity_matrix(records, &estimates, cache).await?;

        let layout = &self.config.layout;
        let graph = match mode {
            LayoutMode::Grid => {
                let similarity = &self.config.similarity;
                let mut edges = build_timeline_edges(&nodes);
                edges.extend(build_similarity_edges(
                    &nodes,
                    &matrix,
                    similarity.top_k,
                    similarity.threshold,
                ));
                LearningGraph {
                    nodes: grid_layout(&nodes, &layout.grid),
                    edges,
                }
            }
            LayoutMode::Polar { center } => {
                let placed = polar_layout(&nodes, &matrix, center.as_deref(), &layout.polar);
                let edges = polar_edges(&placed, &matrix, &layout.polar);
                LearningGraph {
                    nodes: placed,
                    edges,
                }
            }
        };
        info!(
            "learning graph built (nodes={}, edges={})",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    /// The `k` records most similar to `id`.
    pub async fn similar(
        &self,
        records: &[ConfirmedRecord],
        id: &str,
        k: usize,
        cache: &mut EmbeddingCache,
    ) -> Result<Vec<SimilarityScore>, CoreError> {
        if !records.iter().any(|record| record.id == id) {
            return Err(CoreError::UnknownRecord(id.to_string()));
        }
        let estimates = self.estimate(records).await;
        let matrix = self.similarity_matrix(records, &estimates, cache).await?;
        Ok(matrix.top_k(id, k).to_vec())
    }
}
