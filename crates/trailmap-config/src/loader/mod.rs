//! Layered configuration loader with constraints.
//!
//! Discovers configuration layers (system/user/project/etc), validates each
//! against the schema, merges them under optional requirement locks, and
//! produces a final `TrailmapConfig`.

mod layers;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, TrailmapConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "trailmap.json5";
/// Default config directory under user or repo roots.
const DEFAULT_CONFIG_DIR: &str = ".trailmap";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
const SYSTEM_CONFIG_PATH: &str = "/etc/trailmap/trailmap.json5";
#[cfg(unix)]
const SYSTEM_REQUIREMENTS_PATH: &str = "/etc/trailmap/requirements.json5";
#[cfg(windows)]
const SYSTEM_CONFIG_PATH: &str = "C:\\ProgramData\\trailmap\\trailmap.json5";
#[cfg(windows)]
const SYSTEM_REQUIREMENTS_PATH: &str = "C:\\ProgramData\\trailmap\\requirements.json5";

/// Tolerance for weight sums.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: TrailmapConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Locked values that later layers cannot override.
    Requirements,
    System,
    User,
    /// Project root (nearest ancestor holding a marker).
    Project,
    Cwd,
    /// `.trailmap/` under the project root.
    Repo,
    /// Explicit override files (highest precedence).
    Runtime,
}

impl ConfigLayerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLayerSource::Requirements => "requirements",
            ConfigLayerSource::System => "system",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Project => "project",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Repo => "repo",
            ConfigLayerSource::Runtime => "runtime",
        }
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find local layers.
    pub cwd: PathBuf,
    /// System config path (defaults to `/etc/trailmap/trailmap.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// User config path (defaults to `~/.trailmap/trailmap.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Requirements file whose keys lock values.
    pub requirements_path: Option<PathBuf>,
    /// Override files applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layers::default_system_config_path(),
            user_config_path: layers::default_user_config_path(),
            requirements_path: layers::default_requirements_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl TrailmapConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): requirements (constraints), system,
    /// user, project, cwd, repo, runtime overrides.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layers::normalize_path(&options.cwd)?;
        let mut loaded = Vec::new();
        let mut seen = HashSet::new();

        let requirements = match options.requirements_path.as_deref() {
            Some(path) => layers::read_optional(ConfigLayerSource::Requirements, path)?,
            None => None,
        };

        let project_root = layers::find_project_root(&cwd, &options.project_root_markers);
        match project_root.as_ref() {
            Some(root) => debug!("resolved project root: {}", root.display()),
            None => debug!("project root not found; skipping project/repo layers"),
        }

        let mut candidates: Vec<(ConfigLayerSource, PathBuf)> = Vec::new();
        if let Some(path) = options.system_config_path.clone() {
            candidates.push((ConfigLayerSource::System, path));
        }
        if let Some(path) = options.user_config_path.clone() {
            candidates.push((ConfigLayerSource::User, path));
        }
        if let Some(root) = project_root.as_ref() {
            candidates.push((ConfigLayerSource::Project, root.join(DEFAULT_CONFIG_FILE)));
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));
        if let Some(root) = project_root.as_ref() {
            candidates.push((
                ConfigLayerSource::Repo,
                root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
            ));
        }

        for (source, path) in candidates {
            if !seen.insert(layers::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={}, path={})",
                    source.as_str(),
                    path.display()
                );
                continue;
            }
            if let Some(layer) = layers::read_optional(source, &path)? {
                loaded.push(layer);
            }
        }

        for path in &options.runtime_paths {
            loaded.push(layers::read_required(ConfigLayerSource::Runtime, path)?);
        }

        let mut merged = Value::Object(serde_json::Map::new());
        let mut metadata = Vec::with_capacity(loaded.len() + 1);
        if let Some(layer) = &requirements {
            merge::overlay(&mut merged, &layer.value, None);
            metadata.push(layer.meta.clone());
        }
        let locks = requirements.as_ref().map(|layer| &layer.value);
        for layer in loaded {
            merge::overlay(&mut merged, &layer.value, locks);
            metadata.push(layer.meta);
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", metadata.len());
        Ok(LayeredConfig {
            config,
            layers: metadata,
        })
    }

    /// Validate numeric invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_unit("abstraction.merge_margin", self.abstraction.merge_margin)?;

        let similarity = &self.similarity;
        ensure_unit("similarity.threshold", similarity.threshold)?;
        ensure_positive_count("similarity.top_k", similarity.top_k)?;
        let weights = similarity.weights;
        ensure_weights(
            "similarity.weights",
            &[weights.rule, weights.statistical, weights.semantic],
        )?;
        let fallback = similarity.fallback_weights;
        ensure_weights(
            "similarity.fallback_weights",
            &[fallback.rule, fallback.statistical],
        )?;

        let grid = &self.layout.grid;
        ensure_non_negative("layout.grid.padding_x", grid.padding_x)?;
        ensure_non_negative("layout.grid.padding_y", grid.padding_y)?;
        ensure_positive("layout.grid.column_width", grid.column_width)?;
        ensure_positive("layout.grid.row_height", grid.row_height)?;
        ensure_positive("layout.grid.node_width", grid.node_width)?;
        ensure_positive("layout.grid.node_height", grid.node_height)?;

        let polar = &self.layout.polar;
        ensure_positive("layout.polar.center_radius", polar.center_radius)?;
        ensure_positive("layout.polar.radius_increment", polar.radius_increment)?;
        ensure_positive_count("layout.polar.max_layers", polar.max_layers)?;
        ensure_positive_count("layout.polar.max_nodes_per_layer", polar.max_nodes_per_layer)?;
        ensure_positive_count("layout.polar.seed_count", polar.seed_count)?;
        ensure_positive_count("layout.polar.neighbor_k", polar.neighbor_k)?;
        ensure_unit("layout.polar.min_score", polar.min_score)?;
        ensure_unit("layout.polar.edge_min_score", polar.edge_min_score)?;

        let gemini = &self.providers.gemini;
        if !(0.0..=2.0).contains(&gemini.temperature) {
            return Err(ConfigError::Invalid(format!(
                "providers.gemini.temperature must be within [0, 2] (got {})",
                gemini.temperature
            )));
        }
        if gemini.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "providers.gemini.api_key_env must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<TrailmapConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: TrailmapConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn ensure_unit(path: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{path} must be within [0, 1] (got {value})"
        )))
    }
}

fn ensure_positive(path: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{path} must be positive (got {value})"
        )))
    }
}

fn ensure_non_negative(path: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{path} must not be negative (got {value})"
        )))
    }
}

fn ensure_positive_count(path: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{path} must be at least 1")));
    }
    Ok(())
}

fn ensure_weights(path: &str, weights: &[f64]) -> Result<(), ConfigError> {
    for weight in weights {
        ensure_non_negative(path, *weight)?;
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigError::Invalid(format!(
            "{path} must sum to 1 (got {sum})"
        )));
    }
    Ok(())
}
