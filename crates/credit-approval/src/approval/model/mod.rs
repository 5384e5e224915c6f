//! Scoring models consumed by the decision engine.
//!
//! Trained models arrive as portable JSON artifacts and are bound to the feature schema when
//! loaded, so scoring a row is a dense dot product or tree walk with no name lookups.

mod linear;
mod trees;

pub use linear::{AdditiveLogisticModel, AdditiveLogisticSpec};
pub use trees::{TreeEnsembleModel, TreeEnsembleSpec, TreeNodeSpec, TreeSpec};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::encoder::EncodedRow;

/// Probability-scoring capability shared by every loaded model.
pub trait ScoringModel: Send + Sync {
    fn predict_proba(&self, row: &EncodedRow) -> Result<ModelOutput, ScoringError>;
}

/// Raw output of [`ScoringModel::predict_proba`] for a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// Probability of the positive class.
    Scalar(f64),
    /// Per-class probabilities; index 1 is the positive class.
    Classes(Vec<f64>),
}

/// Identifies one of the two loaded models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Additive logistic model; the default decision model.
    Gam,
    /// Gradient boosted tree ensemble.
    Lgb,
}

impl ModelKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Gam, Self::Lgb]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gam => "gam",
            Self::Lgb => "lgb",
        }
    }

    /// Artifact file holding this model inside the model directory.
    pub const fn artifact_file(self) -> &'static str {
        match self {
            Self::Gam => "gam_model.json",
            Self::Lgb => "lgb_model.json",
        }
    }
}

impl Default for ModelKind {
    fn default() -> Self {
        Self::Gam
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = UnknownModelKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gam" => Ok(Self::Gam),
            "lgb" | "lightgbm" => Ok(Self::Lgb),
            _ => Err(UnknownModelKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scoring model '{0}' (expected gam or lgb)")]
pub struct UnknownModelKind(pub String);

/// Failure raised by a model while scoring a row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("model expects {expected} features but the row has {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("model failed: {0}")]
    Backend(String),
}

/// Failure raised while binding a model artifact to the feature schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("model references column '{0}' which is not in the feature schema")]
    UnknownFeature(String),
    #[error("tree {tree} is malformed: {reason}")]
    InvalidTree { tree: usize, reason: String },
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

pub(crate) fn check_width(expected: usize, row: &EncodedRow) -> Result<(), ScoringError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ScoringError::WidthMismatch {
            expected,
            actual: row.len(),
        })
    }
}
