//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use fieldmap_core::{MappingConfig, MappingEngine, ValidationMode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Build an engine with the configured cache
pub fn build_engine(config: &Config, lenient: bool) -> Result<MappingEngine> {
    config.validate()?;
    let mode = if lenient {
        ValidationMode::Lenient
    } else {
        ValidationMode::Strict
    };
    let engine = MappingEngine::with_cache_config(config.cache.to_cache_config())?;
    Ok(engine.with_validation_mode(mode))
}

/// Interpret a command-line value as JSON, falling back to a plain string
pub fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Read a JSON or YAML document, picking the parser from the extension
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

/// Load a saved mapping configuration
pub fn load_mapping_config(path: &Path) -> Result<MappingConfig> {
    let config: MappingConfig = read_document(path)?;
    tracing::debug!(
        name = %config.name,
        sources = config.source_fields.len(),
        targets = config.target_fields.len(),
        mappings = config.mappings.len(),
        "Loaded mapping configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_value_falls_back_to_string() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("[\"a\"]"), json!(["a"]));
        assert_eq!(parse_value("example.com/page"), json!("example.com/page"));
    }

    #[test]
    fn test_read_document_reports_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "a: [unclosed").unwrap();
        let result: Result<Value> = read_document(&path);
        assert!(matches!(result, Err(Error::InvalidFormat { expected, .. }) if expected == "YAML"));

        let missing: Result<Value> = read_document(&dir.path().join("none.json"));
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_build_engine_rejects_invalid_cache_settings() {
        let mut config = Config::default();
        config.cache.max_entries = 0;
        assert!(matches!(build_engine(&config, false), Err(Error::Config(_))));
    }
}
