//! Mapping session: fields on both sides and the mappings between them
//!
//! Each [`FieldMapping`] carries a derived `validation`. It is recomputed on
//! exactly three triggers (creation, a type change of either field, a change of
//! transformation) and nothing else writes it. Invalid mappings stay in the
//! session so they can be shown and corrected, but are not usable.

use crate::engine::MappingEngine;
use crate::export::MappingConfig;
use crate::types::{Field, FieldKind, MappingSpec, SourceField, SourceFieldType, TargetField, TargetFieldType};
use crate::validator::ValidationResult;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A mapping together with its current validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub id: String,
    pub source_field_id: String,
    pub target_field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_id: Option<String>,
    pub validation: ValidationResult,
}

impl FieldMapping {
    pub fn is_usable(&self) -> bool {
        self.validation.is_valid
    }

    pub fn spec(&self) -> MappingSpec {
        MappingSpec {
            id: self.id.clone(),
            source_field_id: self.source_field_id.clone(),
            target_field_id: self.target_field_id.clone(),
            transformation_id: self.transformation_id.clone(),
        }
    }
}

/// Owner of fields and mappings for one Notion database
pub struct MappingSession<'e> {
    engine: &'e MappingEngine,
    name: String,
    notion_database_id: Option<String>,
    sources: Vec<SourceField>,
    targets: Vec<TargetField>,
    mappings: Vec<FieldMapping>,
    next_id: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_with(
    engine: &MappingEngine,
    sources: &[SourceField],
    targets: &[TargetField],
    source_field_id: &str,
    target_field_id: &str,
    transformation_id: Option<&str>,
) -> Option<ValidationResult> {
    let source = sources.iter().find(|f| f.id == source_field_id)?;
    let target = targets.iter().find(|f| f.id == target_field_id)?;
    Some(engine.validate_mapping(source, target, transformation_id))
}

fn add_field<T: FieldKind>(fields: &mut Vec<Field<T>>, field: Field<T>, side: &str) -> Result<()> {
    if fields.iter().any(|f| f.id == field.id) {
        return Err(Error::Validation {
            field: format!("{side}_fields"),
            message: format!("duplicate field id '{}'", field.id),
            expected: None,
        });
    }
    fields.push(field);
    Ok(())
}

fn unknown(field: &str, kind: &str, id: &str) -> Error {
    Error::Validation {
        field: field.to_string(),
        message: format!("unknown {kind} '{id}'"),
        expected: None,
    }
}

impl<'e> MappingSession<'e> {
    pub fn new(engine: &'e MappingEngine, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            engine,
            name: name.into(),
            notion_database_id: None,
            sources: Vec::new(),
            targets: Vec::new(),
            mappings: Vec::new(),
            next_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a session from configuration, validating every mapping
    pub fn from_config(engine: &'e MappingEngine, config: MappingConfig) -> Result<Self> {
        let mut session = Self::new(engine, config.name);
        session.notion_database_id = config.notion_database_id;
        session.created_at = config.created_at;
        for field in config.source_fields {
            add_field(&mut session.sources, field, "source")?;
        }
        for field in config.target_fields {
            add_field(&mut session.targets, field, "target")?;
        }
        for spec in config.mappings {
            if session.mapping(&spec.id).is_some() {
                return Err(Error::Validation {
                    field: "mappings".to_string(),
                    message: format!("duplicate mapping id '{}'", spec.id),
                    expected: None,
                });
            }
            session.insert_mapping(spec)?;
        }
        session.updated_at = config.updated_at;
        Ok(session)
    }

    pub fn to_config(&self) -> MappingConfig {
        MappingConfig {
            name: self.name.clone(),
            notion_database_id: self.notion_database_id.clone(),
            source_fields: self.sources.clone(),
            target_fields: self.targets.clone(),
            mappings: self.mappings.iter().map(FieldMapping::spec).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &'e MappingEngine {
        self.engine
    }

    pub fn set_notion_database_id(&mut self, id: impl Into<String>) {
        self.notion_database_id = Some(id.into());
        self.touch();
    }

    pub fn source_fields(&self) -> &[SourceField] {
        &self.sources
    }

    pub fn target_fields(&self) -> &[TargetField] {
        &self.targets
    }

    pub fn source_field(&self, id: &str) -> Option<&SourceField> {
        self.sources.iter().find(|f| f.id == id)
    }

    pub fn target_field(&self, id: &str) -> Option<&TargetField> {
        self.targets.iter().find(|f| f.id == id)
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn mapping(&self, id: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    /// Mappings that passed validation and may be applied to real data
    pub fn usable_mappings(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter().filter(|m| m.is_usable())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_source_field(&mut self, field: SourceField) -> Result<()> {
        add_field(&mut self.sources, field, "source")?;
        self.touch();
        Ok(())
    }

    pub fn add_target_field(&mut self, field: TargetField) -> Result<()> {
        add_field(&mut self.targets, field, "target")?;
        self.touch();
        Ok(())
    }

    /// Remove a source field and every mapping that reads from it
    pub fn remove_source_field(&mut self, id: &str) -> Option<SourceField> {
        let index = self.sources.iter().position(|f| f.id == id)?;
        self.mappings.retain(|m| m.source_field_id != id);
        self.touch();
        Some(self.sources.remove(index))
    }

    /// Remove a target field and every mapping that writes to it
    pub fn remove_target_field(&mut self, id: &str) -> Option<TargetField> {
        let index = self.targets.iter().position(|f| f.id == id)?;
        self.mappings.retain(|m| m.target_field_id != id);
        self.touch();
        Some(self.targets.remove(index))
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("mapping-{}", self.next_id);
            self.next_id += 1;
            if self.mapping(&id).is_none() {
                return id;
            }
        }
    }

    fn insert_mapping(&mut self, spec: MappingSpec) -> Result<&FieldMapping> {
        let validation = validate_with(
            self.engine,
            &self.sources,
            &self.targets,
            &spec.source_field_id,
            &spec.target_field_id,
            spec.transformation_id.as_deref(),
        );
        let Some(validation) = validation else {
            return Err(if self.source_field(&spec.source_field_id).is_none() {
                unknown("source_field_id", "source field", &spec.source_field_id)
            } else {
                unknown("target_field_id", "target field", &spec.target_field_id)
            });
        };
        if !validation.is_valid {
            debug!(mapping = %spec.id, error = ?validation.error_message(), "stored invalid mapping");
        }
        self.mappings.push(FieldMapping {
            id: spec.id,
            source_field_id: spec.source_field_id,
            target_field_id: spec.target_field_id,
            transformation_id: spec.transformation_id,
            validation,
        });
        self.touch();
        let last = self.mappings.len() - 1;
        Ok(&self.mappings[last])
    }

    /// Propose a new mapping; it is stored even when invalid
    pub fn create_mapping(
        &mut self,
        source_field_id: &str,
        target_field_id: &str,
        transformation_id: Option<&str>,
    ) -> Result<&FieldMapping> {
        let id = self.allocate_id();
        self.insert_mapping(MappingSpec {
            id,
            source_field_id: source_field_id.to_string(),
            target_field_id: target_field_id.to_string(),
            transformation_id: transformation_id.map(str::to_string),
        })
    }

    pub fn remove_mapping(&mut self, id: &str) -> Option<FieldMapping> {
        let index = self.mappings.iter().position(|m| m.id == id)?;
        self.touch();
        Some(self.mappings.remove(index))
    }

    /// Change or clear the transformation of one mapping and revalidate it
    pub fn set_transformation(&mut self, mapping_id: &str, transformation_id: Option<&str>) -> Result<&FieldMapping> {
        let index = self
            .mappings
            .iter()
            .position(|m| m.id == mapping_id)
            .ok_or_else(|| unknown("mapping_id", "mapping", mapping_id))?;
        self.mappings[index].transformation_id = transformation_id.map(str::to_string);
        self.revalidate(|m| m.id == mapping_id);
        self.touch();
        Ok(&self.mappings[index])
    }

    /// Change a source field's type and revalidate the mappings that read from it
    pub fn set_source_field_type(&mut self, field_id: &str, field_type: SourceFieldType) -> Result<()> {
        let field = self
            .sources
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| unknown("source_field_id", "source field", field_id))?;
        field.field_type = field_type;
        self.revalidate(|m| m.source_field_id == field_id);
        self.touch();
        Ok(())
    }

    /// Change a target field's type and revalidate the mappings that write to it
    pub fn set_target_field_type(&mut self, field_id: &str, field_type: TargetFieldType) -> Result<()> {
        let field = self
            .targets
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| unknown("target_field_id", "target field", field_id))?;
        field.field_type = field_type;
        self.revalidate(|m| m.target_field_id == field_id);
        self.touch();
        Ok(())
    }

    fn revalidate(&mut self, affected: impl Fn(&FieldMapping) -> bool) {
        for mapping in self.mappings.iter_mut().filter(|m| affected(m)) {
            if let Some(validation) = validate_with(
                self.engine,
                &self.sources,
                &self.targets,
                &mapping.source_field_id,
                &mapping.target_field_id,
                mapping.transformation_id.as_deref(),
            ) {
                mapping.validation = validation;
            }
        }
    }
}
