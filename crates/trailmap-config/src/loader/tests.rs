//! Tests for layered configuration loading.

use super::*;
use crate::SimilarityConfig;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Project with a `.git` marker and a nested working directory.
fn project(temp: &TempDir) -> (PathBuf, PathBuf) {
    let project_root = temp.path().join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");
    (project_root, cwd)
}

fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.system_config_path = None;
    options.user_config_path = None;
    options.requirements_path = None;
    options
}

#[test]
fn empty_config_uses_defaults() {
    let config = TrailmapConfig::load_from_str("{}").expect("config");
    assert_eq!(config, TrailmapConfig::default());
    assert_eq!(config.similarity.threshold, 0.35);
    assert_eq!(config.similarity.top_k, 2);
    assert_eq!(config.similarity.fallback_weights.rule, 0.57);
    assert_eq!(config.layout.grid.column_width, 300.0);
    assert_eq!(config.layout.polar.max_nodes_per_layer, 12);
    assert_eq!(config.providers.request_delay_ms, 100);
    assert_eq!(config.providers.gemini.embedding_model, "text-embedding-004");
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = TrailmapConfig::load_from_str("{ unexpected: true }").unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("config:unexpected"));
    assert!(msg.contains("unknown key"));
}

#[test]
fn rejects_wrongly_typed_nested_field() {
    let err = TrailmapConfig::load_from_str(r#"{ layout: { polar: { max_layers: "five" } } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("layout.polar.max_layers"));
}

#[test]
fn rejects_weights_not_summing_to_one() {
    let err = TrailmapConfig::load_from_str(
        "{ similarity: { weights: { rule: 0.5, statistical: 0.5, semantic: 0.5 } } }",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("similarity.weights")));
}

#[test]
fn rejects_out_of_range_threshold() {
    let err = TrailmapConfig::load_from_str("{ similarity: { threshold: 1.5 } }").unwrap_err();
    assert!(format!("{err}").contains("similarity.threshold"));
}

#[test]
fn rejects_zero_layers() {
    let err = TrailmapConfig::load_from_str("{ layout: { polar: { max_layers: 0 } } }")
        .unwrap_err();
    assert!(format!("{err}").contains("layout.polar.max_layers"));
}

#[test]
fn layered_config_prefers_repo_over_cwd() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project(&temp);

    let system_config = temp.path().join("system.json5");
    write_json5(&system_config, "{ similarity: { top_k: 1 } }");
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        "{ similarity: { top_k: 3 } }",
    );
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), "{ similarity: { top_k: 4 } }");
    write_json5(
        &project_root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
        "{ similarity: { top_k: 5 } }",
    );

    let mut options = isolated_options(&cwd);
    options.system_config_path = Some(system_config);

    let layered = TrailmapConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.similarity.top_k, 5);
    let sources: Vec<ConfigLayerSource> =
        layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::System,
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Repo,
        ]
    );
}

#[test]
fn requirements_lock_overrides() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(&temp);

    let requirements = temp.path().join("requirements.json5");
    write_json5(&requirements, "{ similarity: { threshold: 0.5 } }");
    let runtime = temp.path().join("runtime.json5");
    write_json5(&runtime, "{ similarity: { threshold: 0.2, top_k: 3 } }");

    let mut options = isolated_options(&cwd).with_runtime_path(&runtime);
    options.requirements_path = Some(requirements);

    let layered = TrailmapConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.similarity.threshold, 0.5);
    assert_eq!(layered.config.similarity.top_k, 3);
}

#[test]
fn runtime_override_wins_without_constraints() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(&temp);

    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        "{ providers: { request_delay_ms: 250 } }",
    );
    let runtime = temp.path().join("runtime.json5");
    write_json5(&runtime, "{ providers: { request_delay_ms: 0 } }");

    let options = isolated_options(&cwd).with_runtime_path(&runtime);
    let layered = TrailmapConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.providers.request_delay_ms, 0);
}

#[test]
fn missing_runtime_file_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(&temp);
    let options = isolated_options(&cwd).with_runtime_path(temp.path().join("absent.json5"));
    let err = TrailmapConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn invalid_layer_names_its_source() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project(&temp);
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), "{ layout: { grid: { gutter: 4 } } }");

    let err = TrailmapConfig::load_layered_with_options(isolated_options(&cwd)).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("cwd("));
    assert!(msg.contains("layout.grid.gutter"));
}

#[test]
fn builder_replaces_sections() {
    let config = TrailmapConfig::builder()
        .similarity(SimilarityConfig {
            threshold: 0.5,
            ..SimilarityConfig::default()
        })
        .build();
    assert_eq!(config.similarity.threshold, 0.5);
    assert!(config.validate().is_ok());
}
