//! Record pipeline
//!
//! Applies a set of validated mappings to source records. A record is either a
//! flat JSON object keyed by source field id, or a Notion page object whose
//! `properties` are looked up by field id, then by field name.

use crate::engine::MappingEngine;
use crate::error::MappingError;
use crate::export::MappingConfig;
use crate::session::MappingSession;
use crate::types::{SourceField, TargetField};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct PipelineStep {
    mapping_id: String,
    source: SourceField,
    target: TargetField,
    transformation_id: Option<String>,
}

/// One field that could not be produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFailure {
    pub mapping_id: String,
    pub source_field_id: String,
    pub target_field_id: String,
    pub error: MappingError,
}

/// Output of one record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub values: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldFailure>,
}

impl RecordOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Output of a batch
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub records: Vec<RecordOutcome>,
    pub failed_fields: usize,
}

/// Validated mappings ready to run against records
pub struct MappingPipeline<'e> {
    engine: &'e MappingEngine,
    steps: Vec<PipelineStep>,
}

impl<'e> MappingPipeline<'e> {
    /// Pipeline over the session's usable mappings
    pub fn from_session(session: &MappingSession<'e>) -> Self {
        let steps = session
            .usable_mappings()
            .filter_map(|mapping| {
                Some(PipelineStep {
                    mapping_id: mapping.id.clone(),
                    source: session.source_field(&mapping.source_field_id)?.clone(),
                    target: session.target_field(&mapping.target_field_id)?.clone(),
                    transformation_id: mapping.transformation_id.clone(),
                })
            })
            .collect();
        Self {
            engine: session.engine(),
            steps,
        }
    }

    /// Validate `config` and build a pipeline over its valid mappings
    ///
    /// Invalid mappings are skipped with a warning.
    pub fn from_config(engine: &'e MappingEngine, config: MappingConfig) -> Result<Self> {
        let session = MappingSession::from_config(engine, config)?;
        for mapping in session.mappings().iter().filter(|m| !m.is_usable()) {
            warn!(
                mapping = %mapping.id,
                error = ?mapping.validation.error_message(),
                "skipping invalid mapping"
            );
        }
        Ok(Self::from_session(&session))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Transform one record
    ///
    /// Missing source values are skipped. A failing field is reported and the
    /// remaining fields are still produced.
    pub fn transform(&self, record: &Value) -> Result<RecordOutcome> {
        let object = record.as_object().ok_or_else(|| Error::Validation {
            field: "record".to_string(),
            message: "record must be a JSON object".to_string(),
            expected: Some("object".to_string()),
        })?;

        let mut outcome = RecordOutcome::default();
        for step in &self.steps {
            let Some(value) = source_value(object, &step.source) else {
                continue;
            };
            let produced = match &step.transformation_id {
                None => Ok(value.clone()),
                Some(id) => self.engine.get_or_compute(id, value),
            };
            match produced {
                Ok(output) => {
                    outcome.values.insert(step.target.id.clone(), output);
                }
                Err(error) => {
                    debug!(mapping = %step.mapping_id, %error, "field transformation failed");
                    outcome.errors.push(FieldFailure {
                        mapping_id: step.mapping_id.clone(),
                        source_field_id: step.source.id.clone(),
                        target_field_id: step.target.id.clone(),
                        error,
                    });
                }
            }
        }
        Ok(outcome)
    }

    /// Transform every record, stopping only on a malformed record
    pub fn transform_batch(&self, records: &[Value]) -> Result<BatchOutcome> {
        self.transform_batch_with(records, |_, _| {})
    }

    /// Like [`transform_batch`](Self::transform_batch), calling `on_record`
    /// with the index and outcome of each record as it completes
    pub fn transform_batch_with(
        &self,
        records: &[Value],
        mut on_record: impl FnMut(usize, &RecordOutcome),
    ) -> Result<BatchOutcome> {
        let mut batch = BatchOutcome::default();
        for (index, record) in records.iter().enumerate() {
            let outcome = self.transform(record)?;
            on_record(index, &outcome);
            batch.failed_fields += outcome.errors.len();
            batch.records.push(outcome);
        }
        Ok(batch)
    }
}

fn source_value<'r>(record: &'r Map<String, Value>, field: &SourceField) -> Option<&'r Value> {
    let Some(properties) = record.get("properties").and_then(Value::as_object) else {
        return record.get(&field.id);
    };
    let property = properties
        .get(&field.id)
        .or_else(|| properties.get(&field.name))?;
    // Notion wraps the value as {"type": "...", "<type>": value}
    match property.get(field.field_type.notion_key()) {
        Some(inner) => Some(inner),
        None => Some(property),
    }
}
