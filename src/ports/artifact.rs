//! Artifact ports: Loading and fetching serialized model handles.

use std::path::Path;
use std::sync::Arc;

use super::Classifier;

/// Errors that can occur while obtaining a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {0}")]
    NotFound(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("failed to download model artifact: {0}")]
    Download(String),
}

/// Deserializes a model handle from a local file.
pub trait ArtifactLoader: Send + Sync {
    /// Load the artifact at `path`.
    ///
    /// # Errors
    /// Returns `ArtifactError::NotFound` if the file is absent and
    /// `ArtifactError::Invalid` if it cannot be decoded.
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>, ArtifactError>;
}

/// Downloads an artifact to a local path, replacing any stale copy.
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `url` into `dest`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Download` on network or HTTP failures.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), ArtifactError>;
}
