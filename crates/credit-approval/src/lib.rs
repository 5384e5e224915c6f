//! Credit card approval predictor: applicant validation, one-hot feature alignment, model
//! scoring, and hard-rule decisions, plus the configuration and telemetry the service binary
//! builds on.

pub mod approval;
pub mod config;
pub mod error;
pub mod telemetry;
