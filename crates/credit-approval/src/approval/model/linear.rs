use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{check_width, sigmoid, BindError, ModelOutput, ScoringError, ScoringModel};
use crate::approval::encoder::EncodedRow;
use crate::approval::schema::FeatureSchema;

/// Serialized form of an additive logistic model keyed by feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveLogisticSpec {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
}

/// Additive logistic model with one weight per schema column.
///
/// Columns without a coefficient contribute nothing. The output is a single positive-class
/// probability.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveLogisticModel {
    intercept: f64,
    weights: Vec<f64>,
}

impl AdditiveLogisticModel {
    pub fn bind(spec: AdditiveLogisticSpec, schema: &FeatureSchema) -> Result<Self, BindError> {
        let mut weights = vec![0.0; schema.width()];
        for (column, coefficient) in spec.coefficients {
            let position = schema
                .position(&column)
                .ok_or(BindError::UnknownFeature(column))?;
            weights[position] = coefficient;
        }

        Ok(Self {
            intercept: spec.intercept,
            weights,
        })
    }

    pub fn margin(&self, row: &EncodedRow) -> Result<f64, ScoringError> {
        check_width(self.weights.len(), row)?;
        let dot: f64 = self
            .weights
            .iter()
            .zip(row.values())
            .map(|(weight, value)| weight * value)
            .sum();
        Ok(self.intercept + dot)
    }
}

impl ScoringModel for AdditiveLogisticModel {
    fn predict_proba(&self, row: &EncodedRow) -> Result<ModelOutput, ScoringError> {
        self.margin(row).map(|margin| ModelOutput::Scalar(sigmoid(margin)))
    }
}
