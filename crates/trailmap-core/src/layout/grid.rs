//! Category-column grid layout.

use serde::Serialize;
use std::collections::BTreeMap;
use trailmap_config::GridConfig;
use trailmap_protocol::{GraphNode, Position};

/// Distance of a column label above the first row.
const LABEL_OFFSET: f64 = 40.0;

/// Place nodes in one column per category.
///
/// Columns are ordered by category name and rows by start time (then id),
/// so the result depends only on the node set. Nodes keep their input
/// order.
pub fn grid_layout(nodes: &[GraphNode], options: &GridConfig) -> Vec<GraphNode> {
    let mut placed = nodes.to_vec();
    for (column, members) in columns(nodes).into_values().enumerate() {
        let mut members = members;
        members.sort_by(|a, b| {
            nodes[*a]
                .start_time
                .cmp(&nodes[*b].start_time)
                .then_with(|| nodes[*a].id.cmp(&nodes[*b].id))
        });
        for (row, idx) in members.into_iter().enumerate() {
            placed[idx].position = Position::new(
                options.padding_x + column as f64 * options.column_width,
                options.padding_y + row as f64 * options.row_height,
            );
        }
    }
    placed
}

fn columns(nodes: &[GraphNode]) -> BTreeMap<&str, Vec<usize>> {
    let mut columns: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        columns.entry(node.category.as_str()).or_default().push(idx);
    }
    columns
}

/// Extent of laid-out nodes including their size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// `None` for an empty slice.
pub fn bounding_box(nodes: &[GraphNode], options: &GridConfig) -> Option<BoundingBox> {
    let first = nodes.first()?;
    let mut bounds = BoundingBox {
        min_x: first.position.x,
        min_y: first.position.y,
        max_x: first.position.x + options.node_width,
        max_y: first.position.y + options.node_height,
    };
    for node in &nodes[1..] {
        bounds.min_x = bounds.min_x.min(node.position.x);
        bounds.min_y = bounds.min_y.min(node.position.y);
        bounds.max_x = bounds.max_x.max(node.position.x + options.node_width);
        bounds.max_y = bounds.max_y.max(node.position.y + options.node_height);
    }
    Some(bounds)
}

/// Column label anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnchor {
    pub category: String,
    pub position: Position,
}

/// Label positions for each grid column, in column order.
pub fn category_positions(nodes: &[GraphNode], options: &GridConfig) -> Vec<CategoryAnchor> {
    columns(nodes)
        .into_keys()
        .enumerate()
        .map(|(column, category)| CategoryAnchor {
            category: category.to_string(),
            position: Position::new(
                options.padding_x + column as f64 * options.column_width,
                options.padding_y - LABEL_OFFSET,
            ),
        })
        .collect()
}
