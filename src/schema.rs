//! Training-time feature schema

use crate::error::{PredictError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Ordered column names the split-layout classifier was trained on.
///
/// Immutable once built. Column order is the positional order of the
/// model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from column names. Duplicates are rejected.
    pub fn new<I, S>(columns: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err("feature schema is empty".to_string());
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), i).is_some() {
                return Err(format!("duplicate column '{}'", column));
            }
        }

        Ok(Self { columns, index })
    }

    /// Load a schema stored as a JSON array of column names
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| PredictError::configuration(path, e))?;
        let columns: Vec<String> =
            serde_json::from_slice(&raw).map_err(|e| PredictError::configuration(path, e))?;
        let schema = Self::new(columns).map_err(|e| PredictError::configuration(path, e))?;

        info!(
            path = %path.display(),
            columns = schema.len(),
            "Feature schema loaded"
        );

        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column in the model input
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_positions() {
        let schema = FeatureSchema::new(["experience", "gender_Male", "gender_Other"]).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.position("gender_Male"), Some(1));
        assert!(!schema.contains("gender_Female"));
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert!(FeatureSchema::new(["a", "b", "a"]).is_err());
        assert!(FeatureSchema::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_columns.json");
        std::fs::write(&path, r#"["training_hours", "company_type_Pvt Ltd"]"#).unwrap();

        let schema = FeatureSchema::from_json_file(&path).unwrap();
        assert_eq!(schema.columns(), ["training_hours", "company_type_Pvt Ltd"]);
    }

    #[test]
    fn test_missing_schema_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        match FeatureSchema::from_json_file(&path) {
            Err(PredictError::Configuration { artifact, .. }) => {
                assert!(artifact.ends_with("absent.json"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_schema_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_columns.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            FeatureSchema::from_json_file(&path),
            Err(PredictError::Configuration { .. })
        ));
    }
}
