//! Credit card approval prediction: feature encoding, model scoring, and hard-rule decisions.
//!
//! Applicant records are validated, one-hot encoded against the trained feature schema, and
//! handed to the decision engine, which rejects out-of-range ages before any model runs.

pub mod artifacts;
pub mod batch;
pub mod context;
pub mod decision;
pub mod domain;
pub mod encoder;
pub mod model;
pub mod router;
pub mod schema;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use batch::{ApplicantCsvReader, BatchEntry, BatchError};
pub use context::{ApprovalContext, ApprovalError, Assessment};
pub use decision::{decide, Decision, DecisionPolicy, HardRule, InferenceError, PredictionResult};
pub use domain::{
    ApplicantRecord, CategoricalField, Citizenship, Ethnicity, FormOptions, Gender, Industry,
    IncomeRate, IncomeType, NumericField, ValidationError, YesNo,
};
pub use encoder::{encode, EncodeError, EncodedRow};
pub use model::{ModelKind, ModelOutput, ScoringError, ScoringModel};
pub use router::approval_router;
pub use schema::{FeatureLayout, FeatureSchema, SchemaError};
