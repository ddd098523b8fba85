//! Employee records as submitted and as encoded for the model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw field value.
///
/// JSON numbers become [`FieldValue::Number`], strings become
/// [`FieldValue::Category`] and booleans become [`FieldValue::Flag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Category(String),
}

impl FieldValue {
    /// Numeric view of the value, `None` for categories
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FieldValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, FieldValue::Category(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Category(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

/// One employee as submitted by the caller, keyed by field name.
///
/// Fields keep the order they were inserted or deserialized in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: IndexMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Positional feature row: column names paired with model-ready values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedRow {
    columns: Vec<String>,
    values: Vec<f32>,
}

impl EncodedRow {
    pub(crate) fn from_parts(columns: Vec<String>, values: Vec<f32>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<f32> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialization() {
        let json = r#"{"experience": 5, "salary": 30000.5, "work_life_balance": "High", "remote": true}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("experience"), Some(&FieldValue::Number(5.0)));
        assert_eq!(record.get("salary").and_then(FieldValue::as_number), Some(30000.5));
        assert_eq!(
            record.get("work_life_balance").and_then(FieldValue::as_category),
            Some("High")
        );
        assert_eq!(record.get("remote").and_then(FieldValue::as_number), Some(1.0));
    }

    #[test]
    fn test_record_keeps_document_order() {
        let record: RawRecord =
            serde_json::from_str(r#"{"salary": 1, "experience": 2, "age": 3}"#).unwrap();
        let fields: Vec<&str> = record.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["salary", "experience", "age"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let record = RawRecord::new()
            .with("gender", "Male")
            .with("experience", 5.0)
            .with("gender", "Female");
        let fields: Vec<&str> = record.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["gender", "experience"]);
        assert_eq!(record.get("gender").and_then(FieldValue::as_category), Some("Female"));
    }

    #[test]
    fn test_numeric_string_stays_categorical() {
        let record: RawRecord = serde_json::from_str(r#"{"lastnewjob": "1"}"#).unwrap();
        assert!(record.get("lastnewjob").unwrap().is_categorical());
    }

    #[test]
    fn test_encoded_row_lookup() {
        let row = EncodedRow::from_parts(
            vec!["experience".to_string(), "gender_Male".to_string()],
            vec![5.0, 1.0],
        );
        assert_eq!(row.get("gender_Male"), Some(1.0));
        assert_eq!(row.get("gender_Female"), None);
        assert_eq!(row.len(), 2);
    }
}
