//! Persisted mapping configurations and export snapshots

use crate::cache::CacheStats;
use crate::engine::MappingEngine;
use crate::types::{MappingSpec, SourceField, TargetField};
use crate::validator::ValidationResult;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fields on both sides plus the mappings between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_database_id: Option<String>,
    #[serde(default)]
    pub source_fields: Vec<SourceField>,
    #[serde(default)]
    pub target_fields: Vec<TargetField>,
    #[serde(default)]
    pub mappings: Vec<MappingSpec>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingConfig {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            notion_database_id: None,
            source_fields: Vec::new(),
            target_fields: Vec::new(),
            mappings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Configuration {
            message: format!("cannot read mapping config {}", path.display()),
            source: Some(e.into()),
        })?;
        Self::from_json(&text)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Validation outcome of one configured mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingValidation {
    pub mapping_id: String,
    pub result: ValidationResult,
}

/// Snapshot handed to storage or reporting layers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub exported_at: DateTime<Utc>,
    pub config: MappingConfig,
    pub validations: Vec<MappingValidation>,
    pub cache_stats: CacheStats,
}

impl ExportData {
    /// Validate `config` against `engine` and capture the result
    pub fn collect(engine: &MappingEngine, config: MappingConfig) -> Result<Self> {
        let results = engine.validate_all(&config.source_fields, &config.target_fields, &config.mappings)?;
        let validations = config
            .mappings
            .iter()
            .zip(results)
            .map(|(mapping, result)| MappingValidation {
                mapping_id: mapping.id.clone(),
                result,
            })
            .collect();
        Ok(Self {
            exported_at: Utc::now(),
            config,
            validations,
            cache_stats: engine.cache_stats(),
        })
    }

    pub fn invalid_count(&self) -> usize {
        self.validations.iter().filter(|v| !v.result.is_valid).count()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
