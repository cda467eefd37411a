//! Capturing output writers for handler tests

use crate::cli::OutputFormat;
use crate::output::OutputWriter;
use fieldmap_core::{MappingConfig, MappingSpec, SourceField, SourceFieldType, TargetField, TargetFieldType};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.0.lock().unwrap()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn capture(format: OutputFormat) -> (OutputWriter, Capture) {
    let capture = Capture::default();
    let writer = OutputWriter::with_writer(format, false, false, 0, Box::new(capture.clone()));
    (writer, capture)
}

fn spec(id: &str, source: &str, target: &str, transformation: Option<&str>) -> MappingSpec {
    MappingSpec {
        id: id.to_string(),
        source_field_id: source.to_string(),
        target_field_id: target.to_string(),
        transformation_id: transformation.map(str::to_string),
    }
}

/// Blog mapping: a direct title, a transformed price and, optionally, a
/// checkbox wired to a gallery which can never validate
pub fn blog_mapping(with_invalid: bool) -> MappingConfig {
    let mut config = MappingConfig::new("blog");
    config.source_fields = vec![
        SourceField::new("name", "Name", SourceFieldType::Title),
        SourceField::new("price", "Price", SourceFieldType::Number),
        SourceField::new("done", "Done", SourceFieldType::Checkbox),
    ];
    config.target_fields = vec![
        TargetField::new("headline", "Headline", TargetFieldType::String),
        TargetField::new("price_label", "Price label", TargetFieldType::String),
        TargetField::new("photos", "Photos", TargetFieldType::Gallery),
    ];
    config.mappings = vec![
        spec("m1", "name", "headline", None),
        spec("m2", "price", "price_label", Some("number-to-string")),
    ];
    if with_invalid {
        config.mappings.push(spec("m3", "done", "photos", None));
    }
    config
}

pub fn write_blog_mapping(dir: &Path, with_invalid: bool) -> PathBuf {
    let path = dir.join("mapping.json");
    blog_mapping(with_invalid).save(&path).unwrap();
    path
}
