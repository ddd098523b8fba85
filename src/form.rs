//! Presentation-boundary validation of submitted records.
//!
//! The prediction core accepts any record; rejecting blank or
//! out-of-range input is the job of the form that collected it.

use crate::error::{PredictError, Result};
use crate::types::record::{FieldValue, RawRecord};
use serde::Deserialize;

/// Kind of value a form field collects
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// One input widget of the form
#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    /// Inclusive lower bound for numeric fields
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric fields
    #[serde(default)]
    pub max: Option<f64>,
    /// Allowed options for categorical fields; empty means free text
    #[serde(default)]
    pub options: Vec<String>,
}

impl FormField {
    pub fn numeric(name: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Numeric,
            min,
            max,
            options: Vec::new(),
        }
    }

    pub fn categorical(name: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Categorical,
            min: None,
            max: None,
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<()> {
        match self.kind {
            FieldKind::Numeric => {
                let n = value
                    .as_number()
                    .ok_or_else(|| PredictError::validation(&self.name, "expected a number"))?;
                if !n.is_finite() {
                    return Err(PredictError::validation(&self.name, "not a finite number"));
                }
                if let Some(min) = self.min {
                    if n < min {
                        return Err(PredictError::validation(
                            &self.name,
                            format!("{} is below the minimum {}", n, min),
                        ));
                    }
                }
                if let Some(max) = self.max {
                    if n > max {
                        return Err(PredictError::validation(
                            &self.name,
                            format!("{} is above the maximum {}", n, max),
                        ));
                    }
                }
            }
            FieldKind::Categorical => {
                let category = value
                    .as_category()
                    .ok_or_else(|| PredictError::validation(&self.name, "expected text"))?;
                if category.trim().is_empty() {
                    return Err(PredictError::validation(&self.name, "must not be blank"));
                }
                if !self.options.is_empty() && !self.options.iter().any(|o| o == category) {
                    return Err(PredictError::validation(
                        &self.name,
                        format!("'{}' is not one of {:?}", category, self.options),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The set of fields a dashboard variant exposes
#[derive(Debug, Clone, Deserialize)]
pub struct InputForm {
    pub fields: Vec<FormField>,
}

impl InputForm {
    /// Fields of the single-artifact dashboard
    pub fn dashboard() -> Self {
        Self {
            fields: vec![
                FormField::numeric("experience", Some(0.0), Some(30.0)),
                FormField::numeric("salary", Some(1000.0), None),
                FormField::numeric("training_hours", Some(0.0), Some(100.0)),
                FormField::categorical("work_life_balance", &["Low", "Medium", "High"]),
            ],
        }
    }

    /// Check that every form field is present and acceptable.
    ///
    /// Fields not declared on the form are left alone.
    pub fn validate(&self, record: &RawRecord) -> Result<()> {
        for field in &self.fields {
            let value = record
                .get(&field.name)
                .ok_or_else(|| PredictError::validation(&field.name, "is required"))?;
            field.check(value)?;
        }
        Ok(())
    }
}
