use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::artifacts::ModelArtifacts;
use super::decision::{decide, DecisionPolicy, InferenceError, PredictionResult};
use super::domain::{ApplicantRecord, ValidationError};
use super::encoder::{encode, EncodeError, EncodedRow};
use super::model::{ModelKind, ScoringModel};
use super::schema::{FeatureLayout, FeatureSchema};

/// Process-wide prediction state: the schema layout, both models, and the decision policy.
///
/// Built once at startup and shared read-only; every method takes `&self`.
pub struct ApprovalContext {
    layout: FeatureLayout,
    models: BTreeMap<ModelKind, Arc<dyn ScoringModel>>,
    default_model: ModelKind,
    policy: DecisionPolicy,
}

impl ApprovalContext {
    pub fn new(
        artifacts: ModelArtifacts,
        default_model: ModelKind,
        policy: DecisionPolicy,
    ) -> Result<Self, ApprovalError> {
        let ModelArtifacts { schema, models } = artifacts;
        if !models.contains_key(&default_model) {
            return Err(ApprovalError::ModelUnavailable(default_model));
        }

        let layout = FeatureLayout::new(schema);
        let unmapped = layout.unmapped_indicators();
        if !unmapped.is_empty() {
            warn!(
                ?unmapped,
                "form options missing from the feature schema will carry no signal"
            );
        }

        Ok(Self {
            layout,
            models,
            default_model,
            policy,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.layout.schema()
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn default_model(&self) -> ModelKind {
        self.default_model
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Validate and encode a record against the loaded schema.
    pub fn encode(&self, record: &ApplicantRecord) -> Result<EncodedRow, ApprovalError> {
        record.validate()?;

        encode(record, &self.layout).map_err(|err| match err {
            EncodeError::WidthMismatch { expected, actual } => {
                ApprovalError::SchemaMismatch { expected, actual }
            }
        })
    }

    /// Score a record with the default model.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<Assessment, ApprovalError> {
        self.predict_with(record, self.default_model)
    }

    pub fn predict_with(
        &self,
        record: &ApplicantRecord,
        kind: ModelKind,
    ) -> Result<Assessment, ApprovalError> {
        let model = self
            .models
            .get(&kind)
            .ok_or(ApprovalError::ModelUnavailable(kind))?;

        let encoded = self.encode(record)?;
        let result = decide(record, &encoded, model.as_ref(), &self.policy).map_err(|err| {
            warn!(model = %kind, error = %err, "inference failed");
            ApprovalError::Inference(err)
        })?;

        info!(
            model = %kind,
            decision = result.decision.label(),
            probability = ?result.probability,
            rule = ?result.rule,
            "prediction complete"
        );

        Ok(Assessment {
            model: kind,
            result,
            dropped_features: encoded.dropped().to_vec(),
        })
    }
}

/// Prediction plus the context needed to audit it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub model: ModelKind,
    #[serde(flatten)]
    pub result: PredictionResult,
    /// Applicant attributes the schema could not represent.
    pub dropped_features: Vec<String>,
}

/// Error raised by [`ApprovalContext`].
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("encoded row has {actual} columns but the feature schema has {expected}")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("prediction failed: {0}")]
    Inference(#[source] InferenceError),
    #[error("{0} model is not loaded")]
    ModelUnavailable(ModelKind),
}
