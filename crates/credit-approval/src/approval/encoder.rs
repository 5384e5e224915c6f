use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicantRecord, CategoricalField, NumericField};
use super::schema::{FeatureLayout, FeatureSchema};

/// Model input row aligned column-for-column with a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedRow {
    #[serde(skip)]
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
    dropped: Vec<String>,
}

impl EncodedRow {
    /// Wraps raw values for a schema, rejecting rows of the wrong width.
    pub fn from_values(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Result<Self, EncodeError> {
        if values.len() != schema.width() {
            return Err(EncodeError::WidthMismatch {
                expected: schema.width(),
                actual: values.len(),
            });
        }

        Ok(Self {
            schema,
            values,
            dropped: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema
            .position(column)
            .and_then(|position| self.values.get(position).copied())
    }

    /// Natural columns the schema had no slot for.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("encoded row has {actual} columns but the feature schema expects {expected}")]
    WidthMismatch { expected: usize, actual: usize },
}

/// One-hot encode `record` into the layout's schema order.
///
/// Every schema column starts at zero. Numeric fields are copied into their column and each
/// categorical field sets exactly one indicator. Attributes the schema never saw are dropped.
pub fn encode(
    record: &ApplicantRecord,
    layout: &FeatureLayout,
) -> Result<EncodedRow, EncodeError> {
    let mut values = vec![0.0; layout.width()];
    let mut dropped = Vec::new();

    for field in NumericField::ordered() {
        match layout.numeric_position(field) {
            Some(position) => values[position] = record.numeric(field),
            None => dropped.push(field.name().to_string()),
        }
    }

    for field in CategoricalField::ordered() {
        let value = record.categorical(field);
        match layout.indicator_position(field, value) {
            Some(position) => values[position] = 1.0,
            None => dropped.push(field.indicator(value)),
        }
    }

    for column in &dropped {
        debug!(%column, "feature schema has no column for applicant attribute; dropping it");
    }

    let mut row = EncodedRow::from_values(layout.schema().clone(), values)?;
    row.dropped = dropped;
    Ok(row)
}
