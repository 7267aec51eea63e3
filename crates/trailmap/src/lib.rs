//! Public SDK surface for trailmap.
//!
//! This crate re-exports the pipeline building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use trailmap_config as config;
pub use trailmap_core as core;
pub use trailmap_gemini as gemini;
pub use trailmap_ontology as ontology;
/// Re-export for convenience.
pub use trailmap_protocol as protocol;

pub use trailmap_core::{EmbeddingCache, GraphPipeline, LayoutMode};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Timestamps carry milliseconds and `RUST_LOG` selects the filter. Safe to
/// call more than once; only the first call installs a logger. This is a
/// no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
