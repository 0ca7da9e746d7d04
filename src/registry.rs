//! Model registry.
//!
//! Maps target identifiers to artifact files and caches load outcomes for the
//! process lifetime. The registry is an explicitly constructed value owned by
//! the caller; there is no module-level cache. Failures are cached alongside
//! successes: the artifacts are static local files, so a load that failed once
//! keeps failing and a retry has no value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifact::DeserializeError;
use crate::encode::FittedPipeline;
use crate::model::YieldModel;

/// File extension for artifact files.
pub const ARTIFACT_EXTENSION: &str = "cyp";

/// Why a target's artifact could not be loaded.
///
/// Cloneable so cached failures can be surfaced again without touching disk.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The backing artifact file is absent.
    #[error("artifact not found at {}", .path.display())]
    Missing { path: PathBuf },

    /// The artifact file exists but failed to deserialize.
    #[error("artifact at {} is unreadable: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl LoadError {
    fn classify(path: &Path, err: DeserializeError) -> Self {
        match err {
            DeserializeError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                Self::Missing {
                    path: path.to_path_buf(),
                }
            }
            other => Self::Corrupt {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

/// Resolves artifact stems to file paths inside a models directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The models directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact file for a stem.
    pub fn artifact_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.{ARTIFACT_EXTENSION}"))
    }
}

/// Registry of yield predictors, loaded lazily and cached for the process
/// lifetime.
#[derive(Debug)]
pub struct ModelRegistry {
    store: ArtifactStore,
    entries: HashMap<String, Result<Arc<YieldModel>, LoadError>>,
}

impl ModelRegistry {
    /// Create a registry over an artifact store.
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            entries: HashMap::new(),
        }
    }

    /// The underlying artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Get the predictor for a stem, loading it on first use.
    ///
    /// The outcome (loaded model or load failure) is cached; later calls
    /// return it without another disk read.
    pub fn get(&mut self, stem: &str) -> Result<Arc<YieldModel>, LoadError> {
        if let Some(cached) = self.entries.get(stem) {
            debug!(stem, "registry cache hit");
            return cached.clone();
        }

        let path = self.store.artifact_path(stem);
        debug!(stem, path = %path.display(), "loading model artifact");

        let outcome = match YieldModel::load(&path) {
            Ok(model) => {
                info!(
                    stem,
                    model_target = model.target(),
                    n_features = model.n_features(),
                    "model artifact loaded"
                );
                Ok(Arc::new(model))
            }
            Err(err) => {
                let err = LoadError::classify(&path, err);
                warn!(stem, error = %err, "model artifact unavailable");
                Err(err)
            }
        };

        self.entries.insert(stem.to_string(), outcome.clone());
        outcome
    }

    /// Check whether a stem's predictor can be loaded.
    ///
    /// Loads (and caches) on first call, like [`get`](Self::get).
    pub fn is_available(&mut self, stem: &str) -> bool {
        self.get(stem).is_ok()
    }
}

/// Load the shared preprocessor pipeline from a store.
///
/// Same failure classification as predictor loads; callers cache the result
/// for the session lifetime.
pub fn load_preprocessor(store: &ArtifactStore, stem: &str) -> Result<FittedPipeline, LoadError> {
    let path = store.artifact_path(stem);
    debug!(stem, path = %path.display(), "loading preprocessor artifact");

    match FittedPipeline::load(&path) {
        Ok(pipeline) => {
            info!(
                stem,
                n_inputs = pipeline.n_inputs(),
                n_outputs = pipeline.n_outputs(),
                "preprocessor artifact loaded"
            );
            Ok(pipeline)
        }
        Err(err) => {
            let err = LoadError::classify(&path, err);
            warn!(stem, error = %err, "preprocessor artifact unavailable");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldMeta, LinearModel, ModelMeta};

    fn temp_store(tag: &str) -> ArtifactStore {
        let dir = std::env::temp_dir().join(format!("cropcast_registry_{tag}"));
        // Start from a clean directory; earlier runs may have left files.
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        ArtifactStore::new(dir)
    }

    fn write_model(store: &ArtifactStore, stem: &str) {
        let model = YieldModel::from_linear_model(
            LinearModel::from_slice(&[0.5], 1.0),
            ModelMeta::new(stem, vec![FieldMeta::numeric("co2")]),
        );
        model.save(store.artifact_path(stem)).unwrap();
    }

    #[test]
    fn store_builds_paths() {
        let store = ArtifactStore::new("models");
        assert_eq!(
            store.artifact_path("wheat_model"),
            PathBuf::from("models/wheat_model.cyp")
        );
    }

    #[test]
    fn loads_and_caches_model() {
        let store = temp_store("load");
        write_model(&store, "wheat_model");

        let mut registry = ModelRegistry::new(store);

        let first = registry.get("wheat_model").unwrap();
        let second = registry.get("wheat_model").unwrap();

        // Same cached instance, not a second load.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_artifact_is_reported_and_cached() {
        let store = temp_store("missing");
        let mut registry = ModelRegistry::new(store.clone());

        let err = registry.get("rice_model").unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
        assert!(!registry.is_available("rice_model"));

        // The failure is cached: creating the file afterwards doesn't
        // change the outcome within this registry's lifetime.
        write_model(&store, "rice_model");
        let err = registry.get("rice_model").unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
    }

    #[test]
    fn corrupt_artifact_is_reported() {
        let store = temp_store("corrupt");
        std::fs::write(store.artifact_path("soybean_model"), b"not an artifact").unwrap();

        let mut registry = ModelRegistry::new(store);

        let err = registry.get("soybean_model").unwrap_err();
        match err {
            LoadError::Corrupt { reason, .. } => {
                assert!(reason.contains("truncated") || reason.contains("not a cropcast"));
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn load_preprocessor_classifies_missing() {
        let store = temp_store("preproc");
        let err = load_preprocessor(&store, "preprocessor").unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
    }
}
