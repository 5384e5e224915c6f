use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use super::model::{
    AdditiveLogisticModel, AdditiveLogisticSpec, BindError, ModelKind, ScoringModel,
    TreeEnsembleModel, TreeEnsembleSpec,
};
use super::schema::{FeatureSchema, SchemaError};

/// File name of the ordered feature column list inside a model directory.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";

/// Read-only outputs of the training process, loaded once at startup.
pub struct ModelArtifacts {
    pub schema: Arc<FeatureSchema>,
    pub models: BTreeMap<ModelKind, Arc<dyn ScoringModel>>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("schema_width", &self.schema.width())
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModelArtifacts {
    /// Load the feature schema and both scoring models from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();

        let columns: Vec<String> = read_json(&dir.join(FEATURE_COLUMNS_FILE))?;
        let schema = Arc::new(FeatureSchema::new(columns).map_err(|source| {
            ArtifactError::Schema {
                path: dir.join(FEATURE_COLUMNS_FILE),
                source,
            }
        })?);

        let mut models: BTreeMap<ModelKind, Arc<dyn ScoringModel>> = BTreeMap::new();
        for kind in ModelKind::ordered() {
            let path = dir.join(kind.artifact_file());
            let model: Arc<dyn ScoringModel> = match kind {
                ModelKind::Gam => {
                    let spec: AdditiveLogisticSpec = read_json(&path)?;
                    Arc::new(
                        AdditiveLogisticModel::bind(spec, &schema)
                            .map_err(|source| ArtifactError::Bind { kind, source })?,
                    )
                }
                ModelKind::Lgb => {
                    let spec: TreeEnsembleSpec = read_json(&path)?;
                    Arc::new(
                        TreeEnsembleModel::bind(spec, &schema)
                            .map_err(|source| ArtifactError::Bind { kind, source })?,
                    )
                }
            };
            models.insert(kind, model);
        }

        info!(
            dir = %dir.display(),
            columns = schema.width(),
            "loaded feature schema and scoring models"
        );

        Ok(Self { schema, models })
    }

    pub fn from_parts(
        schema: Arc<FeatureSchema>,
        models: BTreeMap<ModelKind, Arc<dyn ScoringModel>>,
    ) -> Self {
        Self { schema, models }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid feature schema in {}: {source}", .path.display())]
    Schema { path: PathBuf, source: SchemaError },
    #[error("{kind} model does not match the feature schema: {source}")]
    Bind { kind: ModelKind, source: BindError },
}
