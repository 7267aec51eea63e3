//! Radial layout grown outward from a center category by similarity.

use crate::similarity::SimilarityMatrix;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use trailmap_config::PolarConfig;
use trailmap_protocol::{EdgeKind, GraphEdge, GraphNode, Position};

/// Resolve the center category.
///
/// A requested category is used when some node belongs to it; otherwise
/// the most frequent category wins, ties broken by name.
pub fn center_category(nodes: &[GraphNode], requested: Option<&str>) -> Option<String> {
    if let Some(requested) = requested {
        if nodes.iter().any(|node| node.category == requested) {
            return Some(requested.to_string());
        }
        warn!("center category has no records; using the most frequent (requested={requested})");
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        *counts.entry(node.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .min_by(|(a_name, a_count), (b_name, b_count)| {
            b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
        })
        .map(|(name, _)| name.to_string())
}

/// Place nodes on concentric rings.
///
/// Layer 0 holds the lowest-level records of the center category. Each
/// further layer collects unvisited neighbours of the previous layer that
/// score at least `min_score`, highest level first, capped at
/// `max_nodes_per_layer`. Growth stops when a layer comes up empty or
/// `max_layers` is reached. Only placed nodes are returned, ring by ring.
pub fn polar_layout(
    nodes: &[GraphNode],
    matrix: &SimilarityMatrix,
    center: Option<&str>,
    options: &PolarConfig,
) -> Vec<GraphNode> {
    let Some(center) = center_category(nodes, center) else {
        return Vec::new();
    };
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let mut seeds: Vec<usize> = (0..nodes.len())
        .filter(|idx| nodes[*idx].category == center)
        .collect();
    seeds.sort_by_key(|idx| nodes[*idx].abstraction_level);
    seeds.truncate(options.seed_count.min(options.max_nodes_per_layer));

    let mut visited: HashSet<usize> = seeds.iter().copied().collect();
    let mut layers = vec![seeds];
    while layers.len() < options.max_layers {
        let mut next = Vec::new();
        if let Some(current) = layers.last() {
            for idx in current {
                for score in matrix.top_k(&nodes[*idx].id, options.neighbor_k) {
                    if score.overall_score < options.min_score {
                        continue;
                    }
                    let Some(&other) = index.get(score.record_b.as_str()) else {
                        continue;
                    };
                    // Marked on discovery, so a node cut by the layer cap is
                    // not offered again further out.
                    if visited.insert(other) {
                        next.push(other);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        next.sort_by(|a, b| nodes[*b].abstraction_level.cmp(&nodes[*a].abstraction_level));
        next.truncate(options.max_nodes_per_layer);
        layers.push(next);
    }

    let mut placed = Vec::new();
    for (layer, members) in layers.iter().enumerate() {
        let radius = options.center_radius + layer as f64 * options.radius_increment;
        let step = TAU / members.len() as f64;
        for (slot, idx) in members.iter().enumerate() {
            let angle = slot as f64 * step;
            let mut node = nodes[*idx].clone();
            node.position = Position::new(angle.cos() * radius, angle.sin() * radius);
            node.layer = Some(layer);
            placed.push(node);
        }
    }
    debug!(
        "polar layout placed nodes (center={center}, layers={}, placed={}, unreached={})",
        layers.len(),
        placed.len(),
        nodes.len() - placed.len()
    );
    placed
}

/// Similarity edges between placed nodes whose rings are close.
///
/// For each node, its `edge_top_k` best neighbours scoring at least
/// `edge_min_score` and at most `max_layer_gap` rings away.
pub fn polar_edges(
    placed: &[GraphNode],
    matrix: &SimilarityMatrix,
    options: &PolarConfig,
) -> Vec<GraphEdge> {
    let layers: HashMap<&str, usize> = placed
        .iter()
        .filter_map(|node| node.layer.map(|layer| (node.id.as_str(), layer)))
        .collect();
    let mut edges = Vec::new();
    for node in placed {
        let Some(source_layer) = node.layer else {
            continue;
        };
        for score in matrix.top_k(&node.id, options.edge_top_k) {
            if score.overall_score < options.edge_min_score {
                continue;
            }
            let Some(target_layer) = layers.get(score.record_b.as_str()) else {
                continue;
            };
            if source_layer.abs_diff(*target_layer) > options.max_layer_gap {
                continue;
            }
            edges.push(GraphEdge {
                id: format!("polar-{}-{}", node.id, score.record_b),
                source: node.id.clone(),
                target: score.record_b.clone(),
                kind: EdgeKind::Similarity,
                weight: Some(score.overall_score),
                label: None,
            });
        }
    }
    edges
}
