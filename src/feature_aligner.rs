//! One-hot encoding and column alignment for split-layout models.
//!
//! Reproduces the encoding used at training time: each categorical field
//! becomes an indicator column named `field_value`, numeric fields pass
//! through under their own name, and the result is reindexed against the
//! [`FeatureSchema`]. Missing schema columns are filled with 0 and columns
//! the schema does not know are dropped.
//!
//! The reference category dropped during training is simply absent from
//! the schema, so it (like any category unseen at training time) encodes
//! as all-zero indicators for its field. This loses information silently
//! and is logged at debug level.

use crate::schema::FeatureSchema;
use crate::types::record::{EncodedRow, RawRecord};
use tracing::debug;

/// Separator between field name and category in indicator column names
pub const INDICATOR_SEPARATOR: char = '_';

/// Aligns raw records to a fixed feature schema.
pub struct FeatureAligner<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureAligner<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    /// Number of features produced, always the schema length
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Expand categorical fields into indicator columns.
    ///
    /// Output is in record order and not yet aligned.
    pub fn encode(record: &RawRecord) -> Vec<(String, f32)> {
        record
            .iter()
            .map(|(field, value)| match value.as_category() {
                Some(category) => (indicator_column(field, category), 1.0),
                None => (field.to_string(), value.as_number().unwrap_or(0.0) as f32),
            })
            .collect()
    }

    /// Encode a record and reindex it to the schema.
    pub fn align(&self, record: &RawRecord) -> EncodedRow {
        let mut values = vec![0.0_f32; self.schema.len()];
        let mut dropped = Vec::new();

        for (column, value) in Self::encode(record) {
            match self.schema.position(&column) {
                Some(i) => values[i] = value,
                None => dropped.push(column),
            }
        }

        if !dropped.is_empty() {
            debug!(
                dropped = ?dropped,
                "Columns not present in feature schema were dropped"
            );
        }

        EncodedRow::from_parts(self.schema.columns().to_vec(), values)
    }

    /// Categories of `field` that have an indicator column in the schema
    pub fn known_categories(&self, field: &str) -> Vec<&'a str> {
        let prefix = format!("{}{}", field, INDICATOR_SEPARATOR);
        self.schema
            .columns()
            .iter()
            .filter_map(|c| c.strip_prefix(prefix.as_str()))
            .collect()
    }
}

/// Name of the indicator column for one category of a field
pub fn indicator_column(field: &str, category: &str) -> String {
    format!("{}{}{}", field, INDICATOR_SEPARATOR, category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hr_schema() -> FeatureSchema {
        FeatureSchema::new([
            "city_development_index",
            "experience",
            "training_hours",
            "gender_Male",
            "gender_Other",
            "relevent_experience_No relevent experience",
            "enrolled_university_Part time course",
            "enrolled_university_no_enrollment",
            "education_level_High School",
            "education_level_Masters",
            "education_level_Phd",
            "company_type_Funded Startup",
            "company_type_Pvt Ltd",
            "lastnewjob_2",
            "lastnewjob_4",
            "lastnewjob_>4",
            "lastnewjob_never",
        ])
        .unwrap()
    }

    fn example_record() -> RawRecord {
        RawRecord::new()
            .with("gender", "Male")
            .with("relevent_experience", "Has relevent experience")
            .with("enrolled_university", "no_enrollment")
            .with("education_level", "Graduate")
            .with("company_type", "Pvt Ltd")
            .with("city_development_index", 0.6)
            .with("experience", 5.0)
            .with("training_hours", 120.0)
            .with("lastnewjob", "1")
    }

    #[test]
    fn test_end_to_end_alignment() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);

        let row = aligner.align(&example_record());

        assert_eq!(row.columns(), schema.columns());
        assert_eq!(row.get("city_development_index"), Some(0.6));
        assert_eq!(row.get("experience"), Some(5.0));
        assert_eq!(row.get("training_hours"), Some(120.0));
        assert_eq!(row.get("gender_Male"), Some(1.0));
        assert_eq!(row.get("enrolled_university_no_enrollment"), Some(1.0));
        assert_eq!(row.get("company_type_Pvt Ltd"), Some(1.0));

        let passthrough = ["city_development_index", "experience", "training_hours"];
        for (column, value) in row.iter() {
            if !passthrough.contains(&column) {
                assert!(value == 0.0 || value == 1.0, "{} = {}", column, value);
            }
        }

        // Reference categories ("Has relevent experience", "Graduate", "1")
        // have no indicator column.
        assert_eq!(row.get("relevent_experience_No relevent experience"), Some(0.0));
        assert_eq!(row.get("education_level_Masters"), Some(0.0));
        assert_eq!(row.get("lastnewjob_2"), Some(0.0));
    }

    #[test]
    fn test_shape_invariant() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);

        let records = [
            RawRecord::new(),
            example_record(),
            example_record().with("unexpected_field", 42.0),
            RawRecord::new().with("gender", "Female"),
        ];

        for record in &records {
            let row = aligner.align(record);
            assert_eq!(row.len(), aligner.feature_count());
            assert_eq!(row.columns(), schema.columns());
        }
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);
        let record = example_record();

        let first = aligner.align(&record);
        for _ in 0..10 {
            let next = aligner.align(&record);
            assert_eq!(
                first.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                next.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_unseen_category_encodes_as_zeros() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);
        let record = example_record().with("company_type", "Early Stage Startup");

        let row = aligner.align(&record);

        for category in aligner.known_categories("company_type") {
            assert_eq!(row.get(&indicator_column("company_type", category)), Some(0.0));
        }
    }

    #[test]
    fn test_missing_numeric_field_is_zero_filled() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);
        let record = RawRecord::new().with("gender", "Other");

        let row = aligner.align(&record);
        assert_eq!(row.get("training_hours"), Some(0.0));
        assert_eq!(row.get("gender_Other"), Some(1.0));
    }

    #[test]
    fn test_encode_expands_categories() {
        let record = RawRecord::new().with("lastnewjob", ">4").with("experience", 3.0);
        let encoded = FeatureAligner::encode(&record);

        assert_eq!(
            encoded,
            vec![
                ("lastnewjob_>4".to_string(), 1.0),
                ("experience".to_string(), 3.0),
            ]
        );
    }

    #[test]
    fn test_known_categories() {
        let schema = hr_schema();
        let aligner = FeatureAligner::new(&schema);

        assert_eq!(
            aligner.known_categories("lastnewjob"),
            vec!["2", "4", ">4", "never"]
        );
        assert!(aligner.known_categories("salary").is_empty());
    }
}
