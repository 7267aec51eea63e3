//! Graph nodes and edges consumed by the rendering layer.

use crate::{AbstractionLevel, AbstractionMethod, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 2D position assigned by a layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One node per confirmed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Same as the record id.
    pub id: RecordId,
    pub title: String,
    pub url: String,
    pub category: String,
    pub abstraction_level: AbstractionLevel,
    pub abstraction_confidence: f64,
    pub abstraction_method: AbstractionMethod,
    pub duration_minutes: u64,
    /// Coarse understanding score (2..=5) derived from time spent.
    pub understanding: u8,
    /// Session start date (`YYYY-MM-DD`).
    pub date: String,
    pub start_time: DateTime<Utc>,
    pub transaction_hash: String,
    pub block_height: u64,
    pub verified: bool,
    /// Canonical ontology terms found in the record.
    pub terms: Vec<String>,
    /// Position from the most recent layout pass.
    #[serde(default)]
    pub position: Position,
    /// Ring index when placed by the polar layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
}

/// Edge categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Chronologically adjacent records of one category.
    Timeline,
    /// Records whose combined similarity passed a threshold.
    Similarity,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Timeline => "timeline",
            EdgeKind::Similarity => "similarity",
        }
    }
}

/// Directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: RecordId,
    pub target: RecordId,
    pub kind: EdgeKind,
    /// Similarity score for similarity edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Laid-out graph handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LearningGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl LearningGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges of a single kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn edge_kind_serializes_snake_case() {
        let edge = GraphEdge {
            id: "edge-a-b".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            kind: EdgeKind::Timeline,
            weight: None,
            label: None,
        };
        let value = serde_json::to_value(&edge).expect("encode");
        assert_eq!(
            value,
            json!({ "id": "edge-a-b", "source": "a", "target": "b", "kind": "timeline" })
        );
    }
}
