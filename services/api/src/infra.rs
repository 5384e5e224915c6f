use credit_approval::approval::{ApprovalContext, DecisionPolicy, ModelArtifacts};
use credit_approval::config::ModelConfig;
use credit_approval::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the schema and both models from disk and wrap them for sharing across requests.
pub(crate) fn load_context(config: &ModelConfig) -> Result<Arc<ApprovalContext>, AppError> {
    let artifacts = ModelArtifacts::load(&config.artifact_dir)?;
    let context = ApprovalContext::new(artifacts, config.scoring_model, DecisionPolicy::default())?;

    info!(
        artifact_dir = %config.artifact_dir.display(),
        default_model = %context.default_model(),
        columns = context.schema().width(),
        "approval models loaded"
    );

    Ok(Arc::new(context))
}
