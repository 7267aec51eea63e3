//! Schema validation helpers for trailmap JSON5 configuration.
//!
//! Every layer is checked before merging so that a typo or a wrongly typed
//! value is reported against the file that introduced it.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &[
            "$schema",
            "ontology",
            "abstraction",
            "similarity",
            "layout",
            "providers",
        ],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("ontology") {
        validate_ontology(value, layer, "ontology")?;
    }
    if let Some(value) = map.get("abstraction") {
        validate_abstraction(value, layer, "abstraction")?;
    }
    if let Some(value) = map.get("similarity") {
        validate_similarity(value, layer, "similarity")?;
    }
    if let Some(value) = map.get("layout") {
        validate_layout(value, layer, "layout")?;
    }
    if let Some(value) = map.get("providers") {
        validate_providers(value, layer, "providers")?;
    }
    Ok(())
}

fn validate_ontology(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["path"], layer, path)?;
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

fn validate_abstraction(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["refine_with_classifier", "merge_margin"], layer, path)?;
    if let Some(value) = map.get("refine_with_classifier") {
        expect_bool(value, layer, &join_path(path, "refine_with_classifier"))?;
    }
    if let Some(value) = map.get("merge_margin") {
        expect_f64(value, layer, &join_path(path, "merge_margin"))?;
    }
    Ok(())
}

/// Validate the "similarity" block.
fn validate_similarity(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["threshold", "top_k", "weights", "fallback_weights"],
        layer,
        path,
    )?;
    if let Some(value) = map.get("threshold") {
        expect_f64(value, layer, &join_path(path, "threshold"))?;
    }
    if let Some(value) = map.get("top_k") {
        expect_u64(value, layer, &join_path(path, "top_k"))?;
    }
    if let Some(value) = map.get("weights") {
        validate_number_map(
            value,
            &["rule", "statistical", "semantic"],
            layer,
            &join_path(path, "weights"),
        )?;
    }
    if let Some(value) = map.get("fallback_weights") {
        validate_number_map(
            value,
            &["rule", "statistical"],
            layer,
            &join_path(path, "fallback_weights"),
        )?;
    }
    Ok(())
}

/// Validate the "layout" block.
fn validate_layout(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["grid", "polar"], layer, path)?;
    if let Some(value) = map.get("grid") {
        validate_number_map(
            value,
            &[
                "padding_x",
                "padding_y",
                "column_width",
                "row_height",
                "node_width",
                "node_height",
            ],
            layer,
            &join_path(path, "grid"),
        )?;
    }
    if let Some(value) = map.get("polar") {
        validate_polar(value, layer, &join_path(path, "polar"))?;
    }
    Ok(())
}

fn validate_polar(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    const FLOATS: &[&str] = &[
        "center_radius",
        "radius_increment",
        "min_score",
        "edge_min_score",
    ];
    const COUNTS: &[&str] = &[
        "max_layers",
        "max_nodes_per_layer",
        "seed_count",
        "neighbor_k",
        "edge_top_k",
        "max_layer_gap",
    ];
    let map = expect_object(value, layer, path)?;
    let allowed: Vec<&str> = FLOATS.iter().chain(COUNTS.iter()).copied().collect();
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for (key, value) in map {
        let field = join_path(path, key);
        if COUNTS.contains(&key.as_str()) {
            expect_u64(value, layer, &field)?;
        } else {
            expect_f64(value, layer, &field)?;
        }
    }
    Ok(())
}

/// Validate the "providers" block.
fn validate_providers(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["request_delay_ms", "gemini"], layer, path)?;
    if let Some(value) = map.get("request_delay_ms") {
        expect_u64(value, layer, &join_path(path, "request_delay_ms"))?;
    }
    if let Some(value) = map.get("gemini") {
        validate_gemini(value, layer, &join_path(path, "gemini"))?;
    }
    Ok(())
}

fn validate_gemini(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "api_key_env",
            "base_url",
            "embedding_model",
            "classifier_model",
            "temperature",
            "max_output_tokens",
        ],
        layer,
        path,
    )?;
    for key in ["api_key_env", "base_url", "embedding_model", "classifier_model"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    if let Some(value) = map.get("max_output_tokens") {
        expect_u64(value, layer, &join_path(path, "max_output_tokens"))?;
    }
    Ok(())
}

/// Validate an object whose every allowed key holds a number.
fn validate_number_map(
    value: &Value,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, allowed, layer, path)?;
    for (key, value) in map {
        expect_f64(value, layer, &join_path(path, key))?;
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Non-negative integers only; counts and delays cannot be negative.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
