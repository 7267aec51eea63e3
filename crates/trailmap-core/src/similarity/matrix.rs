//! All-pairs similarity with per-record rankings.

use super::scorer::SimilarityScorer;
use super::semantic::EmbeddingCache;
use crate::CoreError;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use trailmap_protocol::{EmbeddingProvider, RecordId, SimilarityScore};

/// Scores from every record to every other record.
///
/// Each row is sorted by descending overall score and never contains the
/// record itself.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    ids: Vec<RecordId>,
    index: HashMap<RecordId, usize>,
    rows: Vec<Vec<SimilarityScore>>,
}

impl SimilarityMatrix {
    /// Build from local signals plus whatever embeddings `cache` holds.
    ///
    /// Rows are computed in parallel.
    pub fn build(
        scorer: &SimilarityScorer<'_>,
        cache: &EmbeddingCache,
    ) -> Result<Self, CoreError> {
        let ids: Vec<RecordId> = scorer
            .records()
            .iter()
            .map(|record| record.id.clone())
            .collect();
        let rows = ids
            .par_iter()
            .map(|id| -> Result<Vec<SimilarityScore>, CoreError> {
                let mut row = ids
                    .iter()
                    .filter(|other| *other != id)
                    .map(|other| scorer.score_cached(id, other, cache))
                    .collect::<Result<Vec<_>, CoreError>>()?;
                row.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
                Ok(row)
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        let index = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        debug!(
            "similarity matrix built (records={}, semantic={})",
            ids.len(),
            cache.len()
        );
        Ok(Self { ids, index, rows })
    }

    /// Prefetch embeddings sequentially, then build.
    pub async fn build_with_embeddings(
        scorer: &SimilarityScorer<'_>,
        provider: Option<&dyn EmbeddingProvider>,
        cache: &mut EmbeddingCache,
        delay: Duration,
    ) -> Result<Self, CoreError> {
        if let Some(provider) = provider {
            cache.prefetch(provider, scorer.records(), delay).await;
        }
        Self::build(scorer, cache)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record ids in corpus order.
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// Ranked scores from `id`; empty for unknown ids.
    pub fn row(&self, id: &str) -> &[SimilarityScore] {
        self.index
            .get(id)
            .map(|idx| self.rows[*idx].as_slice())
            .unwrap_or_default()
    }

    /// The `k` most similar records to `id`.
    pub fn top_k(&self, id: &str, k: usize) -> &[SimilarityScore] {
        let row = self.row(id);
        &row[..k.min(row.len())]
    }

    /// Score from `left` to `right`.
    pub fn score(&self, left: &str, right: &str) -> Option<&SimilarityScore> {
        self.row(left).iter().find(|score| score.record_b == right)
    }

    /// Unordered pairs scoring at least `threshold`, best first.
    pub fn pairs_above(&self, threshold: f64) -> Vec<&SimilarityScore> {
        let mut pairs: Vec<&SimilarityScore> = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(idx, row)| {
                row.iter().filter(move |score| {
                    score.overall_score >= threshold
                        && self
                            .index
                            .get(&score.record_b)
                            .is_some_and(|other| *other > idx)
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        pairs
    }
}

#[cfg(test)]
impl SimilarityMatrix {
    /// Symmetric matrix from explicit pair scores; unlisted pairs are absent.
    pub(crate) fn from_pairs(ids: &[&str], pairs: &[(&str, &str, f64)]) -> Self {
        let ids: Vec<RecordId> = ids.iter().map(|id| id.to_string()).collect();
        let index: HashMap<RecordId, usize> = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        let mut rows = vec![Vec::new(); ids.len()];
        for &(left, right, score) in pairs {
            for (from, to) in [(left, right), (right, left)] {
                rows[index[from]].push(SimilarityScore {
                    record_a: from.to_string(),
                    record_b: to.to_string(),
                    overall_score: score,
                    rule_based_score: score,
                    statistical_score: score,
                    semantic_score: None,
                    breakdown: Default::default(),
                });
            }
        }
        for row in &mut rows {
            row.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        }
        Self { ids, index, rows }
    }
}
