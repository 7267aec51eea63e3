use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::time::Duration;
use trailmap_config::SimilarityConfig;
use trailmap_core::abstraction::estimate_batch;
use trailmap_core::similarity::{EmbeddingCache, SimilarityMatrix, SimilarityScorer};
use trailmap_core::CoreError;
use trailmap_ontology::Ontology;
use trailmap_protocol::ConfirmedRecord;
use trailmap_test_utils::{FailingEmbedder, FixedEmbedder, MappedEmbedder, record};

fn corpus() -> Vec<ConfirmedRecord> {
    vec![
        record("hooks-a", "React Hooks guide", "https://react.dev/reference/hooks"),
        record("hooks-b", "React Hooks guide", "https://react.dev/reference/hooks"),
        record("git", "Git branching", "https://git-scm.com/book"),
        record("tailwind", "Tailwind layout", "https://tailwindcss.com/docs"),
    ]
}

#[test]
fn identical_records_score_near_one() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());

    let score = scorer.score("hooks-a", "hooks-b").expect("score");
    assert_relative_eq!(score.statistical_score, 1.0, epsilon = 1e-9);
    assert_relative_eq!(score.rule_based_score, 0.9, epsilon = 1e-9);
    assert!(score.overall_score > 0.9);
    assert!(score.breakdown.category_match);
}

#[test]
fn unrelated_records_only_share_level_closeness() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());

    let score = scorer.score("git", "tailwind").expect("score");
    assert!(score.rule_based_score <= 0.1);
    assert!(score.breakdown.shared_terms.is_empty());
    assert!(!score.breakdown.prerequisite_relation);
}

#[test]
fn scores_stay_in_unit_range() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());
    let matrix = SimilarityMatrix::build(&scorer, &EmbeddingCache::new()).expect("matrix");

    for id in matrix.ids() {
        let row = matrix.row(id);
        assert_eq!(row.len(), records.len() - 1);
        for score in row {
            assert_ne!(&score.record_b, id);
            for value in [
                score.overall_score,
                score.rule_based_score,
                score.statistical_score,
            ] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
        assert!(row
            .windows(2)
            .all(|pair| pair[0].overall_score >= pair[1].overall_score));
    }
}

#[test]
fn matrix_queries() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());
    let matrix = SimilarityMatrix::build(&scorer, &EmbeddingCache::new()).expect("matrix");

    let best = matrix.top_k("hooks-a", 1);
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].record_b, "hooks-b");
    assert_eq!(matrix.top_k("hooks-a", 10).len(), 3);
    assert!(matrix.top_k("missing", 3).is_empty());

    let pairs = matrix.pairs_above(0.9);
    assert_eq!(pairs.len(), 1);
    assert_eq!(
        (pairs[0].record_a.as_str(), pairs[0].record_b.as_str()),
        ("hooks-a", "hooks-b")
    );
    assert_eq!(matrix.pairs_above(0.0).len(), 6);
}

#[test]
fn unknown_record_is_an_error() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let scorer = SimilarityScorer::new(
        &ontology,
        &records,
        &HashMap::new(),
        &SimilarityConfig::default(),
    );
    let err = scorer.score("git", "nope").unwrap_err();
    assert!(matches!(err, CoreError::UnknownRecord(id) if id == "nope"));
}

#[tokio::test]
async fn unavailable_embeddings_use_fallback_weights() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());
    let provider = FailingEmbedder::unavailable();
    let mut cache = EmbeddingCache::new();

    let matrix =
        SimilarityMatrix::build_with_embeddings(&scorer, Some(&provider), &mut cache, Duration::ZERO)
            .await
            .expect("matrix");
    assert!(cache.is_empty());
    for id in matrix.ids() {
        for score in matrix.row(id) {
            assert_eq!(score.semantic_score, None);
            assert_relative_eq!(
                score.overall_score,
                0.57 * score.rule_based_score + 0.43 * score.statistical_score,
                epsilon = 1e-9
            );
        }
    }
}

#[tokio::test]
async fn semantic_signal_uses_three_way_weights() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let estimates = estimate_batch(&ontology, &records);
    let scorer = SimilarityScorer::new(&ontology, &records, &estimates, &SimilarityConfig::default());
    let provider = FixedEmbedder::new(vec![0.5, 0.5, 0.0]);
    let mut cache = EmbeddingCache::new();

    let score = scorer
        .score_with_semantic("git", "tailwind", Some(&provider), &mut cache)
        .await
        .expect("score");
    let semantic = score.semantic_score.expect("semantic");
    assert_relative_eq!(semantic, 1.0, epsilon = 1e-6);
    assert_relative_eq!(
        score.overall_score,
        0.2 * score.rule_based_score + 0.3 * score.statistical_score + 0.5 * semantic,
        epsilon = 1e-9
    );
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn failed_embedding_omits_semantic_signal() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let scorer = SimilarityScorer::new(
        &ontology,
        &records,
        &HashMap::new(),
        &SimilarityConfig::default(),
    );
    // Only Git gets a vector.
    let provider = MappedEmbedder::new().with("Git", vec![1.0, 0.0]);
    let mut cache = EmbeddingCache::new();

    let score = scorer
        .score_with_semantic("git", "tailwind", Some(&provider), &mut cache)
        .await
        .expect("score");
    assert_eq!(score.semantic_score, None);
    assert!(cache.contains("git"));
    assert!(!cache.contains("tailwind"));
}

#[tokio::test]
async fn mismatched_dimensions_fail_the_pair() {
    let ontology = Ontology::builtin();
    let records = corpus();
    let scorer = SimilarityScorer::new(
        &ontology,
        &records,
        &HashMap::new(),
        &SimilarityConfig::default(),
    );
    let provider = MappedEmbedder::new()
        .with("Git", vec![1.0, 0.0])
        .with("Tailwind", vec![1.0, 0.0, 0.0]);
    let mut cache = EmbeddingCache::new();

    let err = scorer
        .score_with_semantic("git", "tailwind", Some(&provider), &mut cache)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::DimensionMismatch { left: 2, right: 3 }
    ));
}
