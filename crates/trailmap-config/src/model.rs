//! Configuration schema for trailmap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the learning-graph pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrailmapConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub ontology: OntologyConfig,
    #[serde(default)]
    pub abstraction: AbstractionConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl TrailmapConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> TrailmapConfigBuilder {
        TrailmapConfigBuilder::new()
    }
}

/// Builder for assembling a `TrailmapConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct TrailmapConfigBuilder {
    config: TrailmapConfig,
}

impl TrailmapConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TrailmapConfig::default(),
        }
    }

    pub fn ontology(mut self, ontology: OntologyConfig) -> Self {
        self.config.ontology = ontology;
        self
    }

    pub fn abstraction(mut self, abstraction: AbstractionConfig) -> Self {
        self.config.abstraction = abstraction;
        self
    }

    pub fn similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.config.similarity = similarity;
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn providers(mut self, providers: ProvidersConfig) -> Self {
        self.config.providers = providers;
        self
    }

    /// Finalize and return the built `TrailmapConfig`.
    pub fn build(self) -> TrailmapConfig {
        self.config
    }
}

/// Vocabulary source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OntologyConfig {
    /// JSON5 ontology file replacing the built-in vocabulary.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Abstraction estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractionConfig {
    /// Consult the external classifier after the local estimate.
    #[serde(default)]
    pub refine_with_classifier: bool,
    /// Confidence gap above which one estimate wins outright.
    #[serde(default = "default_merge_margin")]
    pub merge_margin: f64,
}

impl Default for AbstractionConfig {
    fn default() -> Self {
        Self {
            refine_with_classifier: false,
            merge_margin: default_merge_margin(),
        }
    }
}

fn default_merge_margin() -> f64 {
    0.1
}

/// Similarity scoring and edge selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum overall score for a similarity edge.
    #[serde(default = "default_similarity_threshold")]
    pub threshold: f64,
    /// Neighbours considered per record when emitting similarity edges.
    #[serde(default = "default_similarity_top_k")]
    pub top_k: usize,
    /// Weights used when a semantic score is available.
    #[serde(default)]
    pub weights: SignalWeights,
    /// Weights used without a semantic score.
    #[serde(default)]
    pub fallback_weights: FallbackWeights,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: default_similarity_threshold(),
            top_k: default_similarity_top_k(),
            weights: SignalWeights::default(),
            fallback_weights: FallbackWeights::default(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.35
}

fn default_similarity_top_k() -> usize {
    2
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    #[serde(default = "default_rule_weight")]
    pub rule: f64,
    #[serde(default = "default_statistical_weight")]
    pub statistical: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            rule: default_rule_weight(),
            statistical: default_statistical_weight(),
            semantic: default_semantic_weight(),
        }
    }
}

fn default_rule_weight() -> f64 {
    0.2
}

fn default_statistical_weight() -> f64 {
    0.3
}

fn default_semantic_weight() -> f64 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackWeights {
    #[serde(default = "default_fallback_rule_weight")]
    pub rule: f64,
    #[serde(default = "default_fallback_statistical_weight")]
    pub statistical: f64,
}

impl Default for FallbackWeights {
    fn default() -> Self {
        Self {
            rule: default_fallback_rule_weight(),
            statistical: default_fallback_statistical_weight(),
        }
    }
}

fn default_fallback_rule_weight() -> f64 {
    0.57
}

fn default_fallback_statistical_weight() -> f64 {
    0.43
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub polar: PolarConfig,
}

/// Category grid geometry, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_padding")]
    pub padding_x: f64,
    #[serde(default = "default_padding")]
    pub padding_y: f64,
    #[serde(default = "default_column_width")]
    pub column_width: f64,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            padding_x: default_padding(),
            padding_y: default_padding(),
            column_width: default_column_width(),
            row_height: default_row_height(),
            node_width: default_node_width(),
            node_height: default_node_height(),
        }
    }
}

fn default_padding() -> f64 {
    50.0
}

fn default_column_width() -> f64 {
    300.0
}

fn default_row_height() -> f64 {
    180.0
}

fn default_node_width() -> f64 {
    240.0
}

fn default_node_height() -> f64 {
    140.0
}

/// Radial layout growth limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarConfig {
    /// Radius of layer 0.
    #[serde(default = "default_center_radius")]
    pub center_radius: f64,
    /// Radius added per layer.
    #[serde(default = "default_radius_increment")]
    pub radius_increment: f64,
    #[serde(default = "default_max_layers")]
    pub max_layers: usize,
    #[serde(default = "default_max_nodes_per_layer")]
    pub max_nodes_per_layer: usize,
    /// Lowest-level center-category records placed at layer 0.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
    /// Neighbours inspected per node while growing a layer.
    #[serde(default = "default_neighbor_k")]
    pub neighbor_k: usize,
    /// Minimum similarity for growth.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Neighbours inspected per node when emitting polar edges.
    #[serde(default = "default_edge_top_k")]
    pub edge_top_k: usize,
    #[serde(default = "default_edge_min_score")]
    pub edge_min_score: f64,
    /// Largest layer distance an edge may span.
    #[serde(default = "default_max_layer_gap")]
    pub max_layer_gap: usize,
}

impl Default for PolarConfig {
    fn default() -> Self {
        Self {
            center_radius: default_center_radius(),
            radius_increment: default_radius_increment(),
            max_layers: default_max_layers(),
            max_nodes_per_layer: default_max_nodes_per_layer(),
            seed_count: default_seed_count(),
            neighbor_k: default_neighbor_k(),
            min_score: default_min_score(),
            edge_top_k: default_edge_top_k(),
            edge_min_score: default_edge_min_score(),
            max_layer_gap: default_max_layer_gap(),
        }
    }
}

fn default_center_radius() -> f64 {
    150.0
}

fn default_radius_increment() -> f64 {
    300.0
}

fn default_max_layers() -> usize {
    5
}

fn default_max_nodes_per_layer() -> usize {
    12
}

fn default_seed_count() -> usize {
    3
}

fn default_neighbor_k() -> usize {
    5
}

fn default_min_score() -> f64 {
    0.3
}

fn default_edge_top_k() -> usize {
    3
}

fn default_edge_min_score() -> f64 {
    0.4
}

fn default_max_layer_gap() -> usize {
    2
}

/// External capability providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Pause between sequential provider calls in batch operations.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            gemini: GeminiConfig::default(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    100
}

/// Gemini REST settings. The API key itself is read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            classifier_model: default_classifier_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_classifier_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    200
}
