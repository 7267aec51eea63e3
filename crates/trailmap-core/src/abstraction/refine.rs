//! Second stage: reconcile the local estimate with an external classifier.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trailmap_protocol::{
    AbstractionEstimation, AbstractionLevel, AbstractionMethod, Classification,
    ConfirmedRecord, RecordId, TextClassifier,
};

/// Merge a stage-one estimate with a classifier response.
///
/// A side whose confidence leads by more than `margin` wins outright;
/// otherwise the two are averaged.
pub fn merge_classification(
    stage1: &AbstractionEstimation,
    classification: &Classification,
    margin: f64,
) -> AbstractionEstimation {
    let remote = classification.confidence.clamp(0.0, 1.0);
    if remote > stage1.confidence + margin {
        return AbstractionEstimation {
            level: classification.abstraction_level,
            confidence: remote,
            method: AbstractionMethod::Llm,
            reasoning: classification.reasoning.clone(),
            detected_terms: stage1.detected_terms.clone(),
        };
    }
    if stage1.confidence > remote + margin {
        return stage1.clone();
    }

    let sum = stage1.level.get() + classification.abstraction_level.get();
    AbstractionEstimation {
        level: AbstractionLevel::clamped(i64::from(sum.div_ceil(2))),
        confidence: (stage1.confidence + remote) / 2.0,
        method: AbstractionMethod::Combined,
        reasoning: format!(
            "Stage1: {} | LLM: {}",
            stage1.reasoning, classification.reasoning
        ),
        detected_terms: stage1.detected_terms.clone(),
    }
}

/// Refines stage-one estimates through a [`TextClassifier`].
pub struct AbstractionRefiner {
    classifier: Arc<dyn TextClassifier>,
    margin: f64,
    delay: Duration,
}

impl AbstractionRefiner {
    /// `delay` is slept between consecutive classifier calls.
    pub fn new(classifier: Arc<dyn TextClassifier>, margin: f64, delay: Duration) -> Self {
        Self {
            classifier,
            margin,
            delay,
        }
    }

    /// Refine one estimate. Classifier failures keep the local estimate.
    pub async fn refine(
        &self,
        record: &ConfirmedRecord,
        stage1: AbstractionEstimation,
    ) -> AbstractionEstimation {
        if !self.classifier.is_available() {
            debug!("classifier unavailable; keeping local estimate (record={})", record.id);
            return stage1;
        }
        match self
            .classifier
            .classify(&record.session.title, &record.session.url)
            .await
        {
            Ok(classification) => merge_classification(&stage1, &classification, self.margin),
            Err(err) => {
                warn!(
                    "classifier failed; keeping local estimate (record={}, error={})",
                    record.id, err
                );
                stage1
            }
        }
    }

    /// Refine estimates one record at a time, pausing between calls.
    ///
    /// Records without a stage-one estimate are skipped.
    pub async fn refine_batch(
        &self,
        records: &[ConfirmedRecord],
        mut estimates: HashMap<RecordId, AbstractionEstimation>,
    ) -> HashMap<RecordId, AbstractionEstimation> {
        if !self.classifier.is_available() {
            debug!("classifier unavailable; skipping refinement");
            return estimates;
        }
        let mut calls = 0usize;
        for record in records {
            let Some(stage1) = estimates.remove(&record.id) else {
                continue;
            };
            if calls > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            calls += 1;
            let refined = self.refine(record, stage1).await;
            estimates.insert(record.id.clone(), refined);
        }
        debug!("refinement finished (calls={calls})");
        estimates
    }
}
