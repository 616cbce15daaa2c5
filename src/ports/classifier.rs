//! Classifier port: The capability a loaded model artifact exposes.

use crate::domain::PatientRecord;

/// Errors a classifier can raise while predicting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    /// The rows do not carry the columns the model was fit on.
    #[error("{0}")]
    SchemaMismatch(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Trait for a trained, read-only model handle.
///
/// Implementations are produced by an external training process and loaded
/// through an [`ArtifactLoader`](super::ArtifactLoader).
pub trait Classifier: Send + Sync {
    /// Column names the model was fit on, in training order.
    ///
    /// `None` when the artifact does not record them.
    fn expected_columns(&self) -> Option<&[String]>;

    /// Predict one label per row.
    ///
    /// # Errors
    /// Returns `ClassifierError::SchemaMismatch` if a row's columns differ
    /// from what the model expects.
    fn predict(&self, rows: &[PatientRecord]) -> Result<Vec<i64>, ClassifierError>;
}
