//! Graph nodes and edges built from confirmed records.

use crate::abstraction::estimate_abstraction;
use crate::similarity::SimilarityMatrix;
use serde::Serialize;
use std::collections::HashMap;
use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionEstimation, ConfirmedRecord, EdgeKind, GraphEdge, GraphNode, Position, RecordId,
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Coarse understanding score from minutes spent: 2 below 15, 3 below 30,
/// 4 below 60, otherwise 5.
pub fn understanding_score(duration_minutes: u64) -> u8 {
    match duration_minutes {
        0..15 => 2,
        15..30 => 3,
        30..60 => 4,
        _ => 5,
    }
}

/// Node for one record.
///
/// Without an `estimate` the local stage-one estimate is used.
pub fn build_node(
    ontology: &Ontology,
    record: &ConfirmedRecord,
    estimate: Option<&AbstractionEstimation>,
) -> GraphNode {
    let local;
    let estimate = match estimate {
        Some(estimate) => estimate,
        None => {
            local = estimate_abstraction(ontology, record);
            &local
        }
    };
    let duration_minutes = record.duration_minutes();
    GraphNode {
        id: record.id.clone(),
        title: record.session.title.clone(),
        url: record.session.url.clone(),
        category: ontology.classify(record).to_string(),
        abstraction_level: estimate.level,
        abstraction_confidence: estimate.confidence,
        abstraction_method: estimate.method,
        duration_minutes,
        understanding: understanding_score(duration_minutes),
        date: record.date_iso(),
        start_time: record.session.start_time,
        transaction_hash: record.transaction_hash.clone(),
        block_height: record.block_height,
        verified: record.verified,
        terms: ontology.extract_terms(&record.topic_text()),
        position: Position::default(),
        layer: None,
    }
}

/// Nodes in record order.
pub fn build_nodes(
    ontology: &Ontology,
    records: &[ConfirmedRecord],
    estimates: &HashMap<RecordId, AbstractionEstimation>,
) -> Vec<GraphNode> {
    records
        .iter()
        .map(|record| build_node(ontology, record, estimates.get(&record.id)))
        .collect()
}

/// Connect chronologically adjacent nodes of each category.
///
/// Categories are visited in order of first appearance. Each edge runs
/// from the earlier node to the later one and is labelled with the gap in
/// whole days when there is one.
pub fn build_timeline_edges(nodes: &[GraphNode]) -> Vec<GraphEdge> {
    let mut groups: Vec<(&str, Vec<&GraphNode>)> = Vec::new();
    for node in nodes {
        match groups.iter_mut().find(|(category, _)| *category == node.category) {
            Some((_, members)) => members.push(node),
            None => groups.push((node.category.as_str(), vec![node])),
        }
    }

    let mut edges = Vec::new();
    for (_, mut members) in groups {
        members.sort_by_key(|node| node.start_time);
        for pair in members.windows(2) {
            let (source, target) = (pair[0], pair[1]);
            let gap = (target.start_time - source.start_time).num_milliseconds() as f64;
            let days = (gap / MILLIS_PER_DAY).round() as i64;
            let label = match days {
                1 => Some("1 day later".to_string()),
                days if days > 1 => Some(format!("{days} days later")),
                _ => None,
            };
            edges.push(GraphEdge {
                id: format!("edge-{}-{}", source.id, target.id),
                source: source.id.clone(),
                target: target.id.clone(),
                kind: EdgeKind::Timeline,
                weight: None,
                label,
            });
        }
    }
    edges
}

/// Similarity edges from each node to its best `top_k` neighbours scoring
/// at least `threshold`.
///
/// Edges are emitted per source node, so a pair similar in both directions
/// yields two edges.
pub fn build_similarity_edges(
    nodes: &[GraphNode],
    matrix: &SimilarityMatrix,
    top_k: usize,
    threshold: f64,
) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for node in nodes {
        for (idx, score) in matrix.top_k(&node.id, top_k).iter().enumerate() {
            if score.overall_score < threshold {
                continue;
            }
            edges.push(GraphEdge {
                id: format!("sim-{}->{}-{idx}", node.id, score.record_b),
                source: node.id.clone(),
                target: score.record_b.clone(),
                kind: EdgeKind::Similarity,
                weight: Some(score.overall_score),
                label: Some(format!("{:.2}", score.overall_score)),
            });
        }
    }
    edges
}

/// Per-category totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub count: usize,
    pub total_minutes: u64,
    /// Display colour from the ontology, `gray` for unknown categories.
    pub color: String,
}

/// Statistics for every category present, most frequent first, ties by
/// name.
pub fn category_stats(ontology: &Ontology, records: &[ConfirmedRecord]) -> Vec<CategoryStats> {
    let mut totals: HashMap<&str, (usize, u64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(ontology.classify(record)).or_default();
        entry.0 += 1;
        entry.1 += record.duration_minutes();
    }
    let mut stats: Vec<CategoryStats> = totals
        .into_iter()
        .map(|(category, (count, total_minutes))| CategoryStats {
            category: category.to_string(),
            count,
            total_minutes,
            color: ontology
                .category(category)
                .map(|info| info.color.clone())
                .unwrap_or_else(|| "gray".to_string()),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    stats
}

/// Category names present in `records`, most frequent first.
pub fn available_categories(ontology: &Ontology, records: &[ConfirmedRecord]) -> Vec<String> {
    category_stats(ontology, records)
        .into_iter()
        .map(|stats| stats.category)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trailmap_test_utils::record_at;

    #[test]
    fn understanding_follows_duration_bands() {
        assert_eq!(understanding_score(0), 2);
        assert_eq!(understanding_score(14), 2);
        assert_eq!(understanding_score(15), 3);
        assert_eq!(understanding_score(45), 4);
        assert_eq!(understanding_score(60), 5);
    }

    #[test]
    fn node_carries_record_metadata() {
        let ontology = Ontology::builtin();
        let record = record_at("r1", "React入門", "https://ja.react.dev/learn", 0, 20);
        let node = build_node(&ontology, &record, None);
        assert_eq!(node.category, "React/Next.js");
        assert_eq!(node.abstraction_level.get(), 2);
        assert_eq!(node.duration_minutes, 20);
        assert_eq!(node.understanding, 3);
        assert_eq!(node.terms, vec!["React".to_string()]);
        assert_eq!(node.layer, None);
    }

    #[test]
    fn timeline_links_consecutive_records_per_category() {
        let ontology = Ontology::builtin();
        let records = vec![
            record_at("late", "React Hooks", "https://react.dev/hooks", 72, 10),
            record_at("git", "Git branching", "https://git-scm.com/book", 0, 10),
            record_at("early", "React入門", "https://react.dev/learn", 0, 10),
            record_at("mid", "React Context", "https://react.dev/context", 24, 10),
        ];
        let nodes = build_nodes(&ontology, &records, &HashMap::new());
        let edges = build_timeline_edges(&nodes);
        let summary: Vec<(&str, &str, Option<&str>)> = edges
            .iter()
            .map(|edge| {
                (
                    edge.source.as_str(),
                    edge.target.as_str(),
                    edge.label.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("early", "mid", Some("1 day later")),
                ("mid", "late", Some("2 days later")),
            ]
        );
        assert_eq!(edges[0].id, "edge-early-mid");
        assert!(edges.iter().all(|edge| edge.kind == EdgeKind::Timeline));
    }

    #[test]
    fn stats_sort_by_count_then_name() {
        let ontology = Ontology::builtin();
        let records = vec![
            record_at("a", "Git branching", "https://git-scm.com", 0, 10),
            record_at("b", "Tailwind tricks", "https://tailwindcss.com", 0, 5),
            record_at("c", "Tailwind grid", "https://tailwindcss.com/grid", 0, 20),
        ];
        let stats = category_stats(&ontology, &records);
        assert_eq!(stats[0].category, "CSS/Design");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].total_minutes, 25);
        assert_eq!(stats[0].color, "purple");
        assert_eq!(
            available_categories(&ontology, &records),
            vec!["CSS/Design".to_string(), "Other".to_string()]
        );
    }
}
