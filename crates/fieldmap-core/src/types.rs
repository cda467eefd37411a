//! Core data types for the fieldmap engine
//!
//! Source and target field types are two disjoint closed enumerations. Several
//! names (`richText`, `date`, `number`, `status`, `url`, `email`) are spelled the
//! same on both sides but are distinct values with their own compatibility rows.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Property types of a Notion database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFieldType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Files,
    People,
    Relation,
    CreatedTime,
    LastEditedTime,
}

/// Field types of the website content model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetFieldType {
    String,
    Text,
    RichText,
    Html,
    Number,
    Integer,
    Boolean,
    Date,
    Datetime,
    Tags,
    Category,
    Image,
    Gallery,
    Url,
    Email,
    Phone,
    Slug,
    Reference,
    Status,
}

impl SourceFieldType {
    /// Every source type, in declaration order
    pub const ALL: [SourceFieldType; 16] = [
        SourceFieldType::Title,
        SourceFieldType::RichText,
        SourceFieldType::Number,
        SourceFieldType::Select,
        SourceFieldType::MultiSelect,
        SourceFieldType::Status,
        SourceFieldType::Date,
        SourceFieldType::Checkbox,
        SourceFieldType::Url,
        SourceFieldType::Email,
        SourceFieldType::PhoneNumber,
        SourceFieldType::Files,
        SourceFieldType::People,
        SourceFieldType::Relation,
        SourceFieldType::CreatedTime,
        SourceFieldType::LastEditedTime,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Self::ALL`], used to index the compatibility table
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFieldType::Title => "title",
            SourceFieldType::RichText => "richText",
            SourceFieldType::Number => "number",
            SourceFieldType::Select => "select",
            SourceFieldType::MultiSelect => "multiSelect",
            SourceFieldType::Status => "status",
            SourceFieldType::Date => "date",
            SourceFieldType::Checkbox => "checkbox",
            SourceFieldType::Url => "url",
            SourceFieldType::Email => "email",
            SourceFieldType::PhoneNumber => "phoneNumber",
            SourceFieldType::Files => "files",
            SourceFieldType::People => "people",
            SourceFieldType::Relation => "relation",
            SourceFieldType::CreatedTime => "createdTime",
            SourceFieldType::LastEditedTime => "lastEditedTime",
        }
    }

    /// Key holding the value inside a Notion API property object
    pub fn notion_key(self) -> &'static str {
        match self {
            SourceFieldType::RichText => "rich_text",
            SourceFieldType::MultiSelect => "multi_select",
            SourceFieldType::PhoneNumber => "phone_number",
            SourceFieldType::CreatedTime => "created_time",
            SourceFieldType::LastEditedTime => "last_edited_time",
            other => other.as_str(),
        }
    }
}

impl TargetFieldType {
    /// Every target type, in declaration order
    pub const ALL: [TargetFieldType; 19] = [
        TargetFieldType::String,
        TargetFieldType::Text,
        TargetFieldType::RichText,
        TargetFieldType::Html,
        TargetFieldType::Number,
        TargetFieldType::Integer,
        TargetFieldType::Boolean,
        TargetFieldType::Date,
        TargetFieldType::Datetime,
        TargetFieldType::Tags,
        TargetFieldType::Category,
        TargetFieldType::Image,
        TargetFieldType::Gallery,
        TargetFieldType::Url,
        TargetFieldType::Email,
        TargetFieldType::Phone,
        TargetFieldType::Slug,
        TargetFieldType::Reference,
        TargetFieldType::Status,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Self::ALL`], used to index the compatibility table
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetFieldType::String => "string",
            TargetFieldType::Text => "text",
            TargetFieldType::RichText => "richText",
            TargetFieldType::Html => "html",
            TargetFieldType::Number => "number",
            TargetFieldType::Integer => "integer",
            TargetFieldType::Boolean => "boolean",
            TargetFieldType::Date => "date",
            TargetFieldType::Datetime => "datetime",
            TargetFieldType::Tags => "tags",
            TargetFieldType::Category => "category",
            TargetFieldType::Image => "image",
            TargetFieldType::Gallery => "gallery",
            TargetFieldType::Url => "url",
            TargetFieldType::Email => "email",
            TargetFieldType::Phone => "phone",
            TargetFieldType::Slug => "slug",
            TargetFieldType::Reference => "reference",
            TargetFieldType::Status => "status",
        }
    }
}

impl fmt::Display for SourceFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TargetFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn type_names<T: Copy>(all: &[T], name: fn(T) -> &'static str) -> String {
    all.iter().map(|t| name(*t)).collect::<Vec<_>>().join(", ")
}

impl FromStr for SourceFieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Validation {
                field: "source_type".to_string(),
                message: format!("unknown source field type '{}'", s),
                expected: Some(type_names(&Self::ALL, Self::as_str)),
            })
    }
}

impl FromStr for TargetFieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Validation {
                field: "target_type".to_string(),
                message: format!("unknown target field type '{}'", s),
                expected: Some(type_names(&Self::ALL, Self::as_str)),
            })
    }
}

/// How safely a source type can populate a target type
///
/// Ordered `None < Low < Medium < High < Perfect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompatibilityLevel {
    /// No defined conversion
    None,
    /// Needs a transformation that may fail or truncate
    Low,
    /// Needs a transformation that may lose structure
    Medium,
    /// Safe, lossless coercion
    High,
    /// Identical semantic types
    Perfect,
}

impl CompatibilityLevel {
    pub const ALL: [CompatibilityLevel; 5] = [
        CompatibilityLevel::None,
        CompatibilityLevel::Low,
        CompatibilityLevel::Medium,
        CompatibilityLevel::High,
        CompatibilityLevel::Perfect,
    ];

    /// `HIGH` and `PERFECT` pairs may be mapped without a transformation
    pub fn is_direct(self) -> bool {
        self >= CompatibilityLevel::High
    }

    /// `MEDIUM` and `LOW` pairs can only be mapped through a transformation
    pub fn requires_transformation(self) -> bool {
        matches!(self, CompatibilityLevel::Medium | CompatibilityLevel::Low)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompatibilityLevel::None => "NONE",
            CompatibilityLevel::Low => "LOW",
            CompatibilityLevel::Medium => "MEDIUM",
            CompatibilityLevel::High => "HIGH",
            CompatibilityLevel::Perfect => "PERFECT",
        }
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared cost class of a transformation, used for hinting only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceImpact {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for PerformanceImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceImpact::Low => write!(f, "low"),
            PerformanceImpact::Medium => write!(f, "medium"),
            PerformanceImpact::High => write!(f, "high"),
        }
    }
}

/// Which side of a mapping a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    Notion,
    Website,
}

/// Ties a field type enumeration to the side it describes
pub trait FieldKind: Copy + fmt::Debug + fmt::Display + PartialEq {
    const ORIGIN: FieldOrigin;
}

impl FieldKind for SourceFieldType {
    const ORIGIN: FieldOrigin = FieldOrigin::Notion;
}

impl FieldKind for TargetFieldType {
    const ORIGIN: FieldOrigin = FieldOrigin::Website;
}

/// One column or property on either side of a mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: T,
}

/// A Notion database property
pub type SourceField = Field<SourceFieldType>;

/// A website content field
pub type TargetField = Field<TargetFieldType>;

impl<T: FieldKind> Field<T> {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: T) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
        }
    }

    pub fn origin(&self) -> FieldOrigin {
        T::ORIGIN
    }
}

/// A proposed mapping as stored in configuration, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    pub id: String,
    pub source_field_id: String,
    pub target_field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_id: Option<String>,
}
