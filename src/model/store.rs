//! Load-once holder for the model artifact

use super::forest::{Aggregation, Forest, ForestArtifact, ModelError};
use super::Regressor;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, error, info};

/// Failure to bring the model up at startup. Always fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Model file not found. Please check the path: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}

/// Descriptive details shown in the status line
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub model_type: String,
    pub n_trees: usize,
    pub aggregation: Aggregation,
    pub loaded_at: DateTime<Local>,
}

impl ModelInfo {
    pub fn summary(&self) -> String {
        format!(
            "{} · {} trees · {} · loaded {}",
            self.model_type,
            self.n_trees,
            self.aggregation.as_str(),
            self.loaded_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Loaded model plus its details. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: Arc<Forest>,
    pub info: ModelInfo,
}

impl LoadedModel {
    pub fn regressor(&self) -> Arc<dyn Regressor> {
        self.model.clone()
    }
}

/// Reads the artifact on the first successful [`ModelStore::get`] and hands
/// out the same instance afterwards without touching the filesystem.
pub struct ModelStore {
    path: PathBuf,
    expected_features: usize,
    cached: OnceLock<LoadedModel>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>, expected_features: usize) -> Self {
        Self {
            path: path.into(),
            expected_features,
            cached: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<LoadedModel, LoadError> {
        if let Some(loaded) = self.cached.get() {
            debug!("Model served from cache");
            return Ok(loaded.clone());
        }

        let loaded = self.load().inspect_err(|e| {
            error!(error = %e, path = %self.path.display(), "Failed to load model");
        })?;
        if !loaded.model.feature_names().is_empty() {
            debug!(features = ?loaded.model.feature_names(), "Model feature names");
        }
        info!(
            path = %self.path.display(),
            model_type = %loaded.info.model_type,
            trees = loaded.info.n_trees,
            aggregation = loaded.info.aggregation.as_str(),
            "Model loaded"
        );
        Ok(self.cached.get_or_init(|| loaded).clone())
    }

    fn load(&self) -> Result<LoadedModel, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::NotFound {
                path: self.path.clone(),
            });
        }
        let text = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let artifact: ForestArtifact =
            serde_json::from_str(&text).map_err(|source| LoadError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let forest = Forest::from_artifact(artifact)?;
        if forest.n_features() != self.expected_features {
            return Err(ModelError::FeatureCount {
                expected: self.expected_features,
                got: forest.n_features(),
            }
            .into());
        }

        let info = ModelInfo {
            path: self.path.clone(),
            model_type: forest.model_type().to_string(),
            n_trees: forest.n_trees(),
            aggregation: forest.aggregation(),
            loaded_at: Local::now(),
        };
        Ok(LoadedModel {
            model: Arc::new(forest),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STUMP_MODEL: &str = r#"{
        "model_type": "ExtraTreesRegressor",
        "n_features_in": 6,
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [1, -2, -2],
                "threshold": [70.0, -2.0, -2.0],
                "value": [1.5, 1.25, 1.75]
            }
        ]
    }"#;

    fn write_model(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("model.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_once_and_reuses_the_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(&dir, STUMP_MODEL);
        let store = ModelStore::new(&path, 6);
        let first = store.get().unwrap();
        assert_eq!(first.info.n_trees, 1);

        // The file is gone; only a cached instance can satisfy further calls.
        std::fs::remove_file(&path).unwrap();
        for _ in 0..5 {
            let again = store.get().unwrap();
            assert!(Arc::ptr_eq(&first.model, &again.model));
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("0921/ET_optimized.json"), 6);
        let err = store.get().unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().contains("Model file not found"));
        assert!(err.to_string().contains("ET_optimized.json"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(&dir, "{ not json");
        let err = ModelStore::new(&path, 6).get().unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn feature_count_must_match_the_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(&dir, STUMP_MODEL);
        let err = ModelStore::new(&path, 5).get().unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidModel(ModelError::FeatureCount {
                expected: 5,
                got: 6
            })
        ));
    }

    #[test]
    fn sample_artifact_predicts_for_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sample_model.json");
        let loaded = ModelStore::new(path, 6).get().unwrap();
        assert_eq!(loaded.info.n_trees, 2);
        assert_eq!(loaded.model.feature_names().len(), 6);

        // tree 0: 60 <= 70, 500 > 300 -> 2.1; tree 1: 1.0 <= 1.5 -> 1.5
        let x = ndarray::array![[1.0, 60.0, 6.0, 2.0, 500.0, 500.0]];
        let y = loaded.regressor().predict(x.view()).unwrap();
        assert!((y[0] - 1.8).abs() < 1e-12);
    }

    #[test]
    fn loaded_model_predicts_through_trait_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(&dir, STUMP_MODEL);
        let loaded = ModelStore::new(&path, 6).get().unwrap();
        let regressor = loaded.regressor();
        let x = ndarray::array![[1.0, 60.0, 6.0, 2.0, 500.0, 500.0]];
        assert_eq!(regressor.predict(x.view()).unwrap()[0], 1.25);
        assert!(loaded.info.summary().contains("1 trees"));
    }
}
