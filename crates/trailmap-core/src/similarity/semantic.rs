//! Embedding-based similarity with a caller-owned cache.

use crate::CoreError;
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Duration;
use trailmap_protocol::{ConfirmedRecord, EmbeddingProvider, RecordId};

/// Embedding vectors keyed by record id.
///
/// Only successful fetches are stored, so a failed record is requested
/// again on the next call.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingCache {
    vectors: HashMap<RecordId, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    pub fn insert(&mut self, id: impl Into<RecordId>, vector: Vec<f32>) {
        self.vectors.insert(id.into(), vector);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    /// Cached embedding of a record, requesting it when missing.
    pub async fn fetch(
        &mut self,
        provider: &dyn EmbeddingProvider,
        record: &ConfirmedRecord,
    ) -> Option<&[f32]> {
        if !self.vectors.contains_key(&record.id) {
            if !provider.is_available() {
                return None;
            }
            match provider.embed(&record.embedding_text()).await {
                Ok(vector) => {
                    self.vectors.insert(record.id.clone(), vector);
                }
                Err(err) => {
                    warn!(
                        "embedding failed; semantic signal skipped (record={}, error={})",
                        record.id, err
                    );
                    return None;
                }
            }
        }
        self.get(&record.id)
    }

    /// Fetch every uncached record one at a time, sleeping `delay` between
    /// requests. Returns the number of new embeddings.
    pub async fn prefetch(
        &mut self,
        provider: &dyn EmbeddingProvider,
        records: &[ConfirmedRecord],
        delay: Duration,
    ) -> usize {
        if !provider.is_available() {
            debug!("embedding provider unavailable; skipping prefetch");
            return 0;
        }
        let mut requests = 0usize;
        let mut fetched = 0usize;
        for record in records {
            if self.contains(&record.id) {
                continue;
            }
            if requests > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            requests += 1;
            if self.fetch(provider, record).await.is_some() {
                fetched += 1;
            }
        }
        debug!("embedding prefetch finished (requests={requests}, fetched={fetched})");
        fetched
    }
}

/// Cosine similarity clamped to [0, 1].
///
/// A zero vector scores 0; vectors of different length are an error.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f64, CoreError> {
    if left.len() != right.len() {
        return Err(CoreError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let mut dot = 0.0f64;
    let mut left_norm = 0.0f64;
    let mut right_norm = 0.0f64;
    for (a, b) in left.iter().zip(right) {
        let (a, b) = (f64::from(*a), f64::from(*b));
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }
    if left_norm == 0.0 || right_norm == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (left_norm.sqrt() * right_norm.sqrt())).clamp(0.0, 1.0))
}

/// Semantic similarity of two records.
///
/// `Ok(None)` when there is no provider or either embedding is missing.
pub async fn semantic_similarity(
    provider: Option<&dyn EmbeddingProvider>,
    cache: &mut EmbeddingCache,
    left: &ConfirmedRecord,
    right: &ConfirmedRecord,
) -> Result<Option<f64>, CoreError> {
    let Some(provider) = provider else {
        return Ok(None);
    };
    if cache.fetch(provider, left).await.is_none() || cache.fetch(provider, right).await.is_none() {
        return Ok(None);
    }
    cached_similarity(cache, &left.id, &right.id)
}

/// Semantic similarity from cached vectors only.
pub fn cached_similarity(
    cache: &EmbeddingCache,
    left: &str,
    right: &str,
) -> Result<Option<f64>, CoreError> {
    match (cache.get(left), cache.get(right)) {
        (Some(a), Some(b)) => cosine_similarity(a, b).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let score = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).expect("same dims");
        assert_relative_eq!(score, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn opposite_vectors_clamp_to_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).expect("same dims");
        assert_eq!(score, 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).expect("dims"), 0.0);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { left: 2, right: 3 }));
    }

    #[test]
    fn cached_similarity_needs_both_vectors() {
        let mut cache = EmbeddingCache::new();
        cache.insert("a", vec![1.0, 0.0]);
        assert_eq!(cached_similarity(&cache, "a", "b").expect("ok"), None);
        cache.insert("b", vec![0.0, 1.0]);
        assert_eq!(cached_similarity(&cache, "a", "b").expect("ok"), Some(0.0));
    }
}
