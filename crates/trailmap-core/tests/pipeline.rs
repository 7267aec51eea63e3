use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use trailmap_config::{AbstractionConfig, ProvidersConfig, TrailmapConfig};
use trailmap_core::{
    CoreError, EmbeddingCache, GraphPipeline, LayoutMode, SimilarityMatrix, SimilarityScorer,
};
use trailmap_ontology::Ontology;
use trailmap_protocol::{AbstractionMethod, ConfirmedRecord, EdgeKind};
use trailmap_test_utils::{
    FailingClassifier, MappedEmbedder, RecordingEmbedder, StubClassifier, record, record_at,
};

fn config(refine: bool) -> TrailmapConfig {
    TrailmapConfig::builder()
        .abstraction(AbstractionConfig {
            refine_with_classifier: refine,
            ..AbstractionConfig::default()
        })
        .providers(ProvidersConfig {
            request_delay_ms: 0,
            ..ProvidersConfig::default()
        })
        .build()
}

fn pipeline(refine: bool) -> GraphPipeline {
    GraphPipeline::new(Arc::new(Ontology::builtin()), config(refine))
}

fn ten_records() -> Vec<ConfirmedRecord> {
    vec![
        record_at("r1", "React入門", "https://react.dev/learn", 0, 10),
        record_at("c1", "Tailwind utilities", "https://tailwindcss.com/docs/utility", 1, 20),
        record_at("o1", "Git branching", "https://git-scm.com/book", 2, 5),
        record_at("r2", "React Hooks", "https://react.dev/reference/hooks", 26, 30),
        record_at("c2", "Tailwind grid", "https://tailwindcss.com/docs/grid", 27, 10),
        record_at("o2", "Algorithms 101", "https://algo.example.com", 28, 50),
        record_at("r3", "React Context", "https://react.dev/reference/context", 50, 15),
        record_at("c3", "Tailwind flexbox", "https://tailwindcss.com/docs/flex", 75, 40),
        record_at("o3", "Rust ownership", "https://doc.rust-lang.org/book", 76, 70),
        record_at("r4", "React Suspense", "https://react.dev/reference/suspense", 99, 25),
    ]
}

#[test]
fn beginner_react_record_is_categorized() {
    let pipeline = pipeline(false);
    let record = record("r1", "React入門", "https://ja.react.dev/learn");
    assert_eq!(pipeline.ontology().classify(&record), "React/Next.js");
}

#[tokio::test]
async fn empty_input_builds_empty_graph() {
    let pipeline = pipeline(false);
    let mut cache = EmbeddingCache::new();
    for mode in [LayoutMode::Grid, LayoutMode::Polar { center: None }] {
        let graph = pipeline.build(&[], &mode, &mut cache).await.expect("graph");
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }
}

#[tokio::test]
async fn grid_layout_has_one_column_per_category() {
    let pipeline = pipeline(false);
    let mut cache = EmbeddingCache::new();
    let graph = pipeline
        .build(&ten_records(), &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");

    assert_eq!(graph.nodes.len(), 10);
    let mut columns: BTreeMap<String, Vec<(chrono::DateTime<chrono::Utc>, f64)>> =
        BTreeMap::new();
    for node in &graph.nodes {
        columns
            .entry(format!("{}", node.position.x))
            .or_default()
            .push((node.start_time, node.position.y));
    }
    assert_eq!(columns.len(), 3);
    for column in columns.values_mut() {
        column.sort_by_key(|(start, _)| *start);
        assert!(column.windows(2).all(|pair| pair[0].1 < pair[1].1));
    }

    let categories: BTreeSet<&str> = graph
        .nodes
        .iter()
        .map(|node| node.category.as_str())
        .collect();
    assert_eq!(
        categories,
        BTreeSet::from(["CSS/Design", "Other", "React/Next.js"])
    );
}

#[tokio::test]
async fn grid_layout_is_deterministic() {
    let pipeline = pipeline(false);
    let mut cache = EmbeddingCache::new();
    let records = ten_records();
    let first = pipeline
        .build(&records, &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");
    let second = pipeline
        .build(&records, &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");
    assert_eq!(first, second);
}

#[tokio::test]
async fn grid_edges_follow_time_and_similarity() {
    let pipeline = pipeline(false);
    let mut cache = EmbeddingCache::new();
    let graph = pipeline
        .build(&ten_records(), &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");

    let timeline: Vec<(&str, &str)> = graph
        .edges_of(EdgeKind::Timeline)
        .map(|edge| (edge.source.as_str(), edge.target.as_str()))
        .collect();
    assert_eq!(
        timeline,
        vec![
            ("r1", "r2"),
            ("r2", "r3"),
            ("r3", "r4"),
            ("c1", "c2"),
            ("c2", "c3"),
            ("o1", "o2"),
            ("o2", "o3"),
        ]
    );

    let threshold = pipeline.config().similarity.threshold;
    for edge in graph.edges_of(EdgeKind::Similarity) {
        assert_ne!(edge.source, edge.target);
        assert!(edge.weight.unwrap_or_default() >= threshold);
    }
}

#[tokio::test]
async fn confident_classifier_overrides_weak_estimate() {
    let classifier = Arc::new(StubClassifier::new("Other", 5, 0.95));
    let pipeline = pipeline(true).with_classifier(classifier.clone());
    let records = vec![record("o3", "Rust ownership", "https://doc.rust-lang.org/book")];

    let estimates = pipeline.estimate(&records).await;
    let estimate = &estimates["o3"];
    assert_eq!(estimate.method, AbstractionMethod::Llm);
    assert_eq!(estimate.level.get(), 5);
    assert_eq!(classifier.seen_titles(), vec!["Rust ownership".to_string()]);
}

#[tokio::test]
async fn classifier_is_ignored_unless_refinement_is_enabled() {
    let classifier = Arc::new(StubClassifier::new("Other", 5, 0.95));
    let pipeline = pipeline(false).with_classifier(classifier.clone());
    let records = vec![record("o3", "Rust ownership", "https://doc.rust-lang.org/book")];

    let estimates = pipeline.estimate(&records).await;
    assert_eq!(estimates["o3"].method, AbstractionMethod::Heuristic);
    assert!(classifier.seen_titles().is_empty());
}

#[tokio::test]
async fn failing_classifier_keeps_local_estimate() {
    let pipeline = pipeline(true).with_classifier(Arc::new(FailingClassifier::new()));
    let records = vec![record("r1", "React入門", "https://ja.react.dev/learn")];

    let estimates = pipeline.estimate(&records).await;
    assert_eq!(estimates["r1"].method, AbstractionMethod::Ontology);
    assert_eq!(estimates["r1"].level.get(), 2);
}

#[tokio::test]
async fn embeddings_are_cached_between_builds() {
    let (embedder, seen) = RecordingEmbedder::new(4);
    let pipeline = pipeline(false).with_embedder(Arc::new(embedder));
    let records = ten_records();
    let mut cache = EmbeddingCache::new();

    pipeline
        .build(&records, &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");
    pipeline
        .build(&records, &LayoutMode::Grid, &mut cache)
        .await
        .expect("graph");

    assert_eq!(seen.lock().len(), records.len());
    assert_eq!(cache.len(), records.len());
    assert_eq!(seen.lock()[0], "React入門 https://react.dev/learn");
}

#[tokio::test]
async fn dimension_mismatch_fails_the_build() {
    let embedder = MappedEmbedder::new()
        .with("React", vec![1.0, 0.0])
        .with_fallback(vec![1.0, 0.0, 0.0]);
    let pipeline = pipeline(false).with_embedder(Arc::new(embedder));
    let mut cache = EmbeddingCache::new();

    let err = pipeline
        .build(&ten_records(), &LayoutMode::Grid, &mut cache)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DimensionMismatch { .. }));
}

#[tokio::test]
async fn offloaded_matrix_matches_direct_build() {
    let pipeline = pipeline(false);
    let records = ten_records();
    let estimates = pipeline.estimate(&records).await;
    let mut cache = EmbeddingCache::new();

    let matrix = pipeline
        .similarity_matrix(&records, &estimates, &mut cache)
        .await
        .expect("matrix");
    let scorer = SimilarityScorer::new(
        pipeline.ontology(),
        &records,
        &estimates,
        &pipeline.config().similarity,
    );
    let direct = SimilarityMatrix::build(&scorer, &cache).expect("direct");

    assert_eq!(matrix.ids(), direct.ids());
    for id in direct.ids() {
        assert_eq!(matrix.row(id), direct.row(id));
    }
}

#[tokio::test]
async fn similar_returns_ranked_neighbours() {
    let pipeline = pipeline(false);
    let mut cache = EmbeddingCache::new();
    let records = ten_records();

    let neighbours = pipeline
        .similar(&records, "c1", 2, &mut cache)
        .await
        .expect("neighbours");
    assert_eq!(neighbours.len(), 2);
    assert!(neighbours.iter().all(|score| score.record_a == "c1"));
    assert!(neighbours
        .iter()
        .all(|score| score.record_b == "c2" || score.record_b == "c3"));

    let err = pipeline
        .similar(&records, "missing", 2, &mut cache)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownRecord(_)));
}

#[tokio::test]
async fn pipeline_loads_configured_ontology() {
    let dir = tempfile::tempdir().expect("tmp");
    let path = dir.path().join("ontology.json5");
    std::fs::write(
        &path,
        r#"{
            categories: [{ name: "Systems" }, { name: "Misc" }],
            terms: [{ name: "Rust", aliases: ["rust-lang"], category: "Systems", abstractionLevel: 3 }],
            fallbackCategory: "Misc",
        }"#,
    )
    .expect("write");
    let mut config = config(false);
    config.ontology.path = Some(path);

    let pipeline = GraphPipeline::from_config(config).expect("pipeline");
    let record = record("o3", "Ownership", "https://doc.rust-lang.org/book");
    assert_eq!(pipeline.ontology().classify(&record), "Systems");
}
