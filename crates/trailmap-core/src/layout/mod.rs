//! Node placement: category columns or similarity-driven rings.

mod grid;
mod polar;

pub use grid::{BoundingBox, CategoryAnchor, bounding_box, category_positions, grid_layout};
pub use polar::{center_category, polar_edges, polar_layout};

/// Layout selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// One column per category, ordered by date within a column.
    #[default]
    Grid,
    /// Rings grown outward from a center category.
    Polar {
        /// Category at the center; the most frequent one when absent.
        center: Option<String>,
    },
}
