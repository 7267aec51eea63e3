//! Weighted combination of the rule, statistical and semantic signals.

use super::rules::{RecordProfile, rule_similarity};
use super::semantic::{EmbeddingCache, cached_similarity, semantic_similarity};
use super::tfidf::TfIdfCorpus;
use crate::CoreError;
use std::collections::HashMap;
use trailmap_config::{FallbackWeights, SignalWeights, SimilarityConfig};
use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionEstimation, ConfirmedRecord, EmbeddingProvider, RecordId, SimilarityScore,
};

/// Combine the three signals.
///
/// Without a semantic signal the fallback pair is used instead.
pub fn combine(
    rule: f64,
    statistical: f64,
    semantic: Option<f64>,
    weights: SignalWeights,
    fallback: FallbackWeights,
) -> f64 {
    let score = match semantic {
        Some(semantic) => {
            weights.rule * rule + weights.statistical * statistical + weights.semantic * semantic
        }
        None => fallback.rule * rule + fallback.statistical * statistical,
    };
    score.clamp(0.0, 1.0)
}

/// Pairwise scorer over a fixed corpus of records.
///
/// Terms, hostnames and TF-IDF vectors are computed once in
/// [`SimilarityScorer::new`]; scoring a pair only reads them.
pub struct SimilarityScorer<'a> {
    ontology: &'a Ontology,
    records: &'a [ConfirmedRecord],
    index: HashMap<&'a str, usize>,
    profiles: Vec<RecordProfile>,
    corpus: TfIdfCorpus,
    weights: SignalWeights,
    fallback: FallbackWeights,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(
        ontology: &'a Ontology,
        records: &'a [ConfirmedRecord],
        estimates: &HashMap<RecordId, AbstractionEstimation>,
        config: &SimilarityConfig,
    ) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id.as_str(), idx))
            .collect();
        let profiles = records
            .iter()
            .map(|record| RecordProfile::new(ontology, record, estimates.get(&record.id)))
            .collect();
        Self {
            ontology,
            records,
            index,
            profiles,
            corpus: TfIdfCorpus::build(records),
            weights: config.weights,
            fallback: config.fallback_weights,
        }
    }

    pub fn records(&self) -> &'a [ConfirmedRecord] {
        self.records
    }

    pub fn corpus(&self) -> &TfIdfCorpus {
        &self.corpus
    }

    pub fn profile(&self, id: &str) -> Option<&RecordProfile> {
        self.index.get(id).map(|idx| &self.profiles[*idx])
    }

    /// Score without the semantic signal.
    pub fn score(&self, left: &str, right: &str) -> Result<SimilarityScore, CoreError> {
        self.score_with(left, right, None)
    }

    /// Score using embeddings already in `cache`.
    pub fn score_cached(
        &self,
        left: &str,
        right: &str,
        cache: &EmbeddingCache,
    ) -> Result<SimilarityScore, CoreError> {
        let semantic = cached_similarity(cache, left, right)?;
        self.score_with(left, right, semantic)
    }

    /// Score, fetching embeddings through `provider` as needed.
    pub async fn score_with_semantic(
        &self,
        left: &str,
        right: &str,
        provider: Option<&dyn EmbeddingProvider>,
        cache: &mut EmbeddingCache,
    ) -> Result<SimilarityScore, CoreError> {
        let left_record = &self.records[self.position(left)?];
        let right_record = &self.records[self.position(right)?];
        let semantic = semantic_similarity(provider, cache, left_record, right_record).await?;
        self.score_with(left, right, semantic)
    }

    pub(crate) fn score_with(
        &self,
        left: &str,
        right: &str,
        semantic: Option<f64>,
    ) -> Result<SimilarityScore, CoreError> {
        let left_profile = &self.profiles[self.position(left)?];
        let right_profile = &self.profiles[self.position(right)?];
        let (rule, breakdown) = rule_similarity(self.ontology, left_profile, right_profile);
        let statistical = self.corpus.similarity(left, right);
        Ok(SimilarityScore {
            record_a: left.to_string(),
            record_b: right.to_string(),
            overall_score: combine(rule, statistical, semantic, self.weights, self.fallback),
            rule_based_score: rule,
            statistical_score: statistical,
            semantic_score: semantic,
            breakdown,
        })
    }

    fn position(&self, id: &str) -> Result<usize, CoreError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::UnknownRecord(id.to_string()))
    }
}
