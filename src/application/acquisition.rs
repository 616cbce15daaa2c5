//! Model acquisition: Obtains the classifier once and memoizes the result.
//!
//! Acquisition also resolves the record schema against the loaded model, so
//! a column mismatch is detected once here and replayed on every request
//! instead of being rediscovered per prediction.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::domain::{RecordSchema, SchemaError};
use crate::ports::{ArtifactError, ArtifactFetcher, ArtifactLoader, Classifier};
use crate::AdherenceError;

/// How the artifact reaches the local path before loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionStrategy {
    /// The artifact must already exist at `path`. Failure is fatal.
    LocalFile { path: PathBuf },
    /// Download `url` to `path`, then load. Failure leaves no handle.
    RemoteFetch { url: String, path: PathBuf },
}

impl AcquisitionStrategy {
    fn path(&self) -> &std::path::Path {
        match self {
            Self::LocalFile { path } | Self::RemoteFetch { path, .. } => path,
        }
    }
}

/// A loaded classifier together with the schema its records must follow.
pub struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    schema: Result<RecordSchema, SchemaError>,
}

impl LoadedModel {
    /// Pair a classifier with its schema.
    ///
    /// When `prefer_model_columns` is set and the classifier names its
    /// columns, the schema is built from them in the model's order;
    /// otherwise `fallback` is used.
    #[must_use]
    pub fn resolve(
        classifier: Arc<dyn Classifier>,
        fallback: &RecordSchema,
        prefer_model_columns: bool,
    ) -> Self {
        let schema = match classifier.expected_columns() {
            Some(names) if prefer_model_columns => RecordSchema::from_names(names),
            _ => Ok(fallback.clone()),
        };
        Self { classifier, schema }
    }

    #[must_use]
    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// The resolved schema, or the mismatch found at acquisition time.
    pub fn schema(&self) -> Result<&RecordSchema, &SchemaError> {
        self.schema.as_ref()
    }
}

/// Memoized outcome of acquisition.
pub enum HandleState {
    Ready(LoadedModel),
    /// Remote acquisition failed; requests report "model not loaded".
    Absent { reason: String },
    /// Local acquisition failed; the process should not start.
    Failed { reason: String },
}

/// Owns the acquisition strategy and the process-lifetime model handle.
pub struct ModelProvider<L, F>
where
    L: ArtifactLoader,
    F: ArtifactFetcher,
{
    strategy: AcquisitionStrategy,
    loader: L,
    fetcher: F,
    fallback_schema: RecordSchema,
    prefer_model_columns: bool,
    state: OnceLock<HandleState>,
}

impl<L, F> ModelProvider<L, F>
where
    L: ArtifactLoader,
    F: ArtifactFetcher,
{
    /// Create a provider; nothing is loaded until [`ModelProvider::acquire`].
    pub fn new(
        strategy: AcquisitionStrategy,
        loader: L,
        fetcher: F,
        fallback_schema: RecordSchema,
        prefer_model_columns: bool,
    ) -> Self {
        Self {
            strategy,
            loader,
            fetcher,
            fallback_schema,
            prefer_model_columns,
            state: OnceLock::new(),
        }
    }

    /// Obtain the model handle, running acquisition on first call only.
    ///
    /// # Errors
    /// Returns `AdherenceError::ModelLoad` if the local artifact could not be
    /// loaded. A failed remote acquisition is not an error here; it yields
    /// `HandleState::Absent`.
    pub fn acquire(&self) -> Result<&HandleState, AdherenceError> {
        let state = self.state.get_or_init(|| self.run_acquisition());
        match state {
            HandleState::Failed { reason } => Err(AdherenceError::ModelLoad(reason.clone())),
            other => Ok(other),
        }
    }

    #[cfg(test)]
    fn is_acquired(&self) -> bool {
        self.state.get().is_some()
    }

    /// User-visible reason the handle is absent, if acquisition ran and failed.
    #[must_use]
    pub fn acquisition_error(&self) -> Option<&str> {
        match self.state.get()? {
            HandleState::Absent { reason } | HandleState::Failed { reason } => Some(reason.as_str()),
            HandleState::Ready(_) => None,
        }
    }

    fn run_acquisition(&self) -> HandleState {
        match &self.strategy {
            AcquisitionStrategy::LocalFile { path } => {
                tracing::info!("Loading model from {:?}", path);
                match self.loader.load(path) {
                    Ok(classifier) => self.ready(classifier),
                    Err(e) => {
                        tracing::error!("Failed to load model from {:?}: {}", path, e);
                        HandleState::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            AcquisitionStrategy::RemoteFetch { url, path } => {
                match self.fetch_and_load(url, path) {
                    Ok(classifier) => self.ready(classifier),
                    Err(e) => {
                        tracing::error!("Error loading model: {}", e);
                        HandleState::Absent {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        }
    }

    fn fetch_and_load(
        &self,
        url: &str,
        path: &std::path::Path,
    ) -> Result<Arc<dyn Classifier>, ArtifactError> {
        self.fetcher.fetch(url, path)?;
        self.loader.load(path)
    }

    fn ready(&self, classifier: Arc<dyn Classifier>) -> HandleState {
        let model =
            LoadedModel::resolve(classifier, &self.fallback_schema, self.prefer_model_columns);
        match model.schema() {
            Ok(schema) => tracing::info!(
                "Model ready from {:?} with {} column(s): {:?}",
                self.strategy.path(),
                schema.len(),
                schema.names()
            ),
            Err(e) => tracing::warn!("Model loaded but its columns cannot be supplied: {}", e),
        }
        HandleState::Ready(model)
    }
}
