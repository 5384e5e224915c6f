use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use super::domain::{CategoricalField, NumericField};

/// Ordered feature columns the scoring models were trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|candidate| candidate == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("feature schema lists no columns")]
    Empty,
    #[error("feature schema lists column '{0}' more than once")]
    DuplicateColumn(String),
}

/// Column positions for every form attribute, resolved once against a schema.
///
/// Numeric fields and `(field, value)` indicator pairs that the schema does not contain map to
/// `None`; the encoder drops them without signalling an error.
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    schema: Arc<FeatureSchema>,
    numeric: BTreeMap<NumericField, Option<usize>>,
    indicators: HashMap<(CategoricalField, &'static str), Option<usize>>,
}

impl FeatureLayout {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        let index: HashMap<&str, usize> = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(position, column)| (column.as_str(), position))
            .collect();

        let numeric = NumericField::ordered()
            .into_iter()
            .map(|field| (field, index.get(field.name()).copied()))
            .collect();

        let mut indicators = HashMap::new();
        for field in CategoricalField::ordered() {
            for value in field.options() {
                let position = index.get(field.indicator(value).as_str()).copied();
                indicators.insert((field, value), position);
            }
        }

        Self {
            schema,
            numeric,
            indicators,
        }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn width(&self) -> usize {
        self.schema.width()
    }

    pub fn numeric_position(&self, field: NumericField) -> Option<usize> {
        self.numeric.get(&field).copied().flatten()
    }

    pub fn indicator_position(
        &self,
        field: CategoricalField,
        value: &'static str,
    ) -> Option<usize> {
        self.indicators.get(&(field, value)).copied().flatten()
    }

    /// Form options with no counterpart in the schema.
    pub fn unmapped_indicators(&self) -> Vec<String> {
        CategoricalField::ordered()
            .into_iter()
            .flat_map(|field| {
                field
                    .options()
                    .into_iter()
                    .filter(move |value| self.indicator_position(field, *value).is_none())
                    .map(move |value| field.indicator(value))
            })
            .collect()
    }
}
