use serde::{Deserialize, Serialize};

use super::domain::ApplicantRecord;
use super::encoder::EncodedRow;
use super::model::{ModelOutput, ScoringError, ScoringModel};

/// Thresholds applied by [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub minimum_age: u8,
    pub maximum_age: u8,
    pub approval_threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            minimum_age: 18,
            maximum_age: 65,
            approval_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

/// Non-learned constraints checked before the model runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardRule {
    UnderMinimumAge,
    OverMaximumAge,
}

impl HardRule {
    pub fn reason(self, policy: &DecisionPolicy) -> String {
        match self {
            HardRule::UnderMinimumAge => format!(
                "Applicant must be at least {} years old.",
                policy.minimum_age
            ),
            HardRule::OverMaximumAge => "Age limit for credit card exceeded.".to_string(),
        }
    }

    fn triggered_by(record: &ApplicantRecord, policy: &DecisionPolicy) -> Option<Self> {
        if record.age < policy.minimum_age {
            Some(HardRule::UnderMinimumAge)
        } else if record.age > policy.maximum_age {
            Some(HardRule::OverMaximumAge)
        } else {
            None
        }
    }
}

/// Outcome of a single prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub decision: Decision,
    /// Positive-class probability; absent when a hard rule rejected the applicant unscored.
    pub probability: Option<f64>,
    pub reason: Option<String>,
    pub rule: Option<HardRule>,
}

impl PredictionResult {
    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("model returned {0} class probabilities; the positive class needs at least 2")]
    MissingPositiveClass(usize),
    #[error("model returned unusable probability {0}")]
    InvalidProbability(f64),
}

/// Apply the hard age rules, then score `encoded` with `model`.
///
/// The model is only invoked when neither age rule fires. Approval requires a probability
/// strictly above the policy threshold.
pub fn decide(
    record: &ApplicantRecord,
    encoded: &EncodedRow,
    model: &dyn ScoringModel,
    policy: &DecisionPolicy,
) -> Result<PredictionResult, InferenceError> {
    if let Some(rule) = HardRule::triggered_by(record, policy) {
        return Ok(PredictionResult {
            decision: Decision::Rejected,
            probability: None,
            reason: Some(rule.reason(policy)),
            rule: Some(rule),
        });
    }

    let probability = positive_probability(model.predict_proba(encoded)?)?;
    let decision = if probability > policy.approval_threshold {
        Decision::Approved
    } else {
        Decision::Rejected
    };

    Ok(PredictionResult {
        decision,
        probability: Some(probability),
        reason: None,
        rule: None,
    })
}

fn positive_probability(output: ModelOutput) -> Result<f64, InferenceError> {
    let probability = match output {
        ModelOutput::Scalar(probability) => probability,
        ModelOutput::Classes(classes) => *classes
            .get(1)
            .ok_or(InferenceError::MissingPositiveClass(classes.len()))?,
    };

    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(InferenceError::InvalidProbability(probability))
    }
}
