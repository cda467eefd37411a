//! Compatibility matrix between Notion property types and website field types
//!
//! The matrix is a static two-dimensional table indexed by enum ordinals, built
//! at compile time from a flat list of entries. Every pair missing from the list
//! is `NONE`, so lookups are total and never fail.

use crate::types::{CompatibilityLevel, SourceField, SourceFieldType, TargetFieldType};
use serde::Serialize;

use CompatibilityLevel::{High, Low, Medium, Perfect};
use SourceFieldType as S;
use TargetFieldType as T;

type Entry = (SourceFieldType, TargetFieldType, CompatibilityLevel);

const ENTRIES: &[Entry] = &[
    (S::Title, T::String, High),
    (S::Title, T::Text, High),
    (S::Title, T::RichText, High),
    (S::Title, T::Html, Medium),
    (S::Title, T::Slug, Medium),
    (S::RichText, T::RichText, Perfect),
    (S::RichText, T::Html, High),
    (S::RichText, T::String, Medium),
    (S::RichText, T::Text, Medium),
    (S::RichText, T::Tags, Low),
    (S::RichText, T::Slug, Low),
    (S::Number, T::Number, Perfect),
    (S::Number, T::Integer, Medium),
    (S::Number, T::String, Low),
    (S::Number, T::Text, Low),
    (S::Number, T::Boolean, Low),
    (S::Select, T::Category, Perfect),
    (S::Select, T::Status, High),
    (S::Select, T::String, High),
    (S::Select, T::Text, High),
    (S::Select, T::Tags, Medium),
    (S::MultiSelect, T::Tags, High),
    (S::MultiSelect, T::Category, Low),
    (S::MultiSelect, T::String, Low),
    (S::MultiSelect, T::Text, Low),
    (S::Status, T::Status, Perfect),
    (S::Status, T::Category, High),
    (S::Status, T::String, Medium),
    (S::Status, T::Text, Medium),
    (S::Date, T::Date, Perfect),
    (S::Date, T::Datetime, High),
    (S::Date, T::String, Low),
    (S::Date, T::Text, Low),
    (S::Checkbox, T::Boolean, Perfect),
    (S::Checkbox, T::String, Low),
    (S::Checkbox, T::Text, Low),
    (S::Url, T::Url, Perfect),
    (S::Url, T::String, High),
    (S::Url, T::Text, High),
    (S::Url, T::Image, Medium),
    (S::Email, T::Email, Perfect),
    (S::Email, T::String, High),
    (S::Email, T::Text, High),
    (S::PhoneNumber, T::Phone, Perfect),
    (S::PhoneNumber, T::String, High),
    (S::PhoneNumber, T::Text, High),
    (S::Files, T::Gallery, High),
    (S::Files, T::Image, Medium),
    (S::Files, T::Url, Low),
    (S::Files, T::String, Low),
    (S::Files, T::Text, Low),
    (S::People, T::Reference, Medium),
    (S::People, T::String, Low),
    (S::People, T::Text, Low),
    (S::Relation, T::Reference, High),
    (S::Relation, T::Tags, Low),
    (S::CreatedTime, T::Datetime, Perfect),
    (S::CreatedTime, T::Date, High),
    (S::CreatedTime, T::String, Low),
    (S::LastEditedTime, T::Datetime, Perfect),
    (S::LastEditedTime, T::Date, High),
    (S::LastEditedTime, T::String, Low),
];

type Matrix = [[CompatibilityLevel; TargetFieldType::COUNT]; SourceFieldType::COUNT];

const fn build_matrix(entries: &[Entry]) -> Matrix {
    let mut matrix = [[CompatibilityLevel::None; TargetFieldType::COUNT]; SourceFieldType::COUNT];
    let mut i = 0;
    while i < entries.len() {
        let (source, target, level) = entries[i];
        matrix[source.index()][target.index()] = level;
        i += 1;
    }
    matrix
}

static MATRIX: Matrix = build_matrix(ENTRIES);

/// Compatibility of populating `target` from `source`
///
/// Total over both enumerations. Source and target are never swapped.
pub fn get_compatibility_level(source: SourceFieldType, target: TargetFieldType) -> CompatibilityLevel {
    MATRIX[source.index()][target.index()]
}

/// Every target type reachable from `source`, best first
///
/// Ties keep declaration order of [`TargetFieldType::ALL`].
pub fn compatible_targets(source: SourceFieldType) -> Vec<(TargetFieldType, CompatibilityLevel)> {
    let mut targets: Vec<_> = TargetFieldType::ALL
        .into_iter()
        .map(|target| (target, get_compatibility_level(source, target)))
        .filter(|(_, level)| *level > CompatibilityLevel::None)
        .collect();
    // sort_by is stable
    targets.sort_by(|a, b| b.1.cmp(&a.1));
    targets
}

/// Candidate source fields for one target type, grouped by how they would map
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendations<'a> {
    pub direct: Vec<&'a SourceField>,
    pub requires_transformation: Vec<&'a SourceField>,
    pub incompatible: Vec<&'a SourceField>,
}

/// Partition `fields` by their compatibility with `target`
pub fn recommend_sources(target: TargetFieldType, fields: &[SourceField]) -> Recommendations<'_> {
    let mut recommendations = Recommendations::default();
    for field in fields {
        let level = get_compatibility_level(field.field_type, target);
        if level.is_direct() {
            recommendations.direct.push(field);
        } else if level.requires_transformation() {
            recommendations.requires_transformation.push(field);
        } else {
            recommendations.incompatible.push(field);
        }
    }
    recommendations
}

/// One row of the rendered matrix
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub source: SourceFieldType,
    pub levels: Vec<(TargetFieldType, CompatibilityLevel)>,
}

/// The full matrix in declaration order, one row per source type
pub fn matrix_rows() -> Vec<MatrixRow> {
    SourceFieldType::ALL
        .into_iter()
        .map(|source| MatrixRow {
            source,
            levels: TargetFieldType::ALL
                .into_iter()
                .map(|target| (target, get_compatibility_level(source, target)))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_documented_pairs() {
        assert_eq!(get_compatibility_level(S::MultiSelect, T::Tags), High);
        assert_eq!(get_compatibility_level(S::RichText, T::String), Medium);
        assert_eq!(get_compatibility_level(S::RichText, T::RichText), Perfect);
        assert_eq!(get_compatibility_level(S::Title, T::String), High);
        assert_eq!(get_compatibility_level(S::MultiSelect, T::String), Low);
        assert_eq!(
            get_compatibility_level(S::Files, T::Boolean),
            CompatibilityLevel::None
        );
    }

    #[test]
    fn test_unlisted_pairs_default_to_none() {
        assert_eq!(
            get_compatibility_level(S::Checkbox, T::Gallery),
            CompatibilityLevel::None
        );
        assert_eq!(
            get_compatibility_level(S::People, T::Boolean),
            CompatibilityLevel::None
        );
    }

    #[test]
    fn test_entries_have_no_duplicate_pairs() {
        let mut seen = HashSet::new();
        for (source, target, _) in ENTRIES {
            assert!(
                seen.insert((*source, *target)),
                "pair {source} -> {target} listed twice"
            );
        }
    }

    #[test]
    fn test_every_source_reaches_some_target() {
        for source in SourceFieldType::ALL {
            assert!(!compatible_targets(source).is_empty(), "{source} maps nowhere");
        }
    }

    #[test]
    fn test_compatible_targets_sorted_best_first() {
        let targets = compatible_targets(S::Select);
        assert_eq!(targets[0], (T::Category, Perfect));
        assert!(targets.windows(2).all(|w| w[0].1 >= w[1].1));
        // String is declared before Text, both HIGH
        let high: Vec<_> = targets.iter().filter(|(_, l)| *l == High).map(|(t, _)| *t).collect();
        assert_eq!(high, vec![T::String, T::Text, T::Status]);
    }

    #[test]
    fn test_recommend_sources_partitions_fields() {
        let fields = vec![
            SourceField::new("a", "Tags", S::MultiSelect),
            SourceField::new("b", "Summary", S::RichText),
            SourceField::new("c", "Attachments", S::Files),
        ];
        let recs = recommend_sources(T::Tags, &fields);
        assert_eq!(recs.direct.len(), 1);
        assert_eq!(recs.direct[0].id, "a");
        assert_eq!(recs.requires_transformation[0].id, "b");
        assert_eq!(recs.incompatible[0].id, "c");
    }

    #[test]
    fn test_matrix_rows_cover_every_pair() {
        let rows = matrix_rows();
        assert_eq!(rows.len(), SourceFieldType::COUNT);
        assert!(rows.iter().all(|r| r.levels.len() == TargetFieldType::COUNT));
    }
}
