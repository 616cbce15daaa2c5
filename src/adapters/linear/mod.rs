//! Linear classifier adapter: JSON-exported logistic models.
//!
//! The training pipeline exports a fitted linear model as JSON:
//!
//! ```json
//! {
//!   "feature_names": ["Sex", "Target group", "Age"],
//!   "classes": [0, 1],
//!   "coefficients": [[0.4, -0.2, 0.01]],
//!   "intercepts": [-0.3],
//!   "threshold": 0.5
//! }
//! ```
//!
//! One coefficient row is a binary logistic model scored against
//! `threshold`; `k` rows are one-vs-rest over `k` classes and the class with
//! the largest decision value wins. `feature_names` is optional: without it
//! only the row width is checked.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::PatientRecord;
use crate::ports::{ArtifactError, ArtifactLoader, Classifier, ClassifierError};

/// Upper bound on model width; the form collects ten columns.
const MAX_FEATURES: usize = 64;

fn default_threshold() -> f64 {
    0.5
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearModel {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<i64>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl ExportedLinearModel {
    /// Sanity-check parameter shapes.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` describing the first inconsistency.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(ArtifactError::Invalid(format!(
                "expected at least 2 classes, got {n_classes}"
            )));
        }

        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if self.coefficients.len() != expected_rows || self.intercepts.len() != expected_rows {
            return Err(ArtifactError::Invalid(format!(
                "{n_classes} classes need {expected_rows} coefficient row(s) and intercept(s), got {} and {}",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }

        let width = self.coefficients[0].len();
        if width == 0 || width > MAX_FEATURES {
            return Err(ArtifactError::Invalid(format!(
                "invalid feature count: got {width}, max {MAX_FEATURES}"
            )));
        }
        if self.coefficients.iter().any(|row| row.len() != width) {
            return Err(ArtifactError::Invalid(
                "coefficient rows have different lengths".into(),
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != width {
                return Err(ArtifactError::Invalid(format!(
                    "feature_names has {} entries but coefficients have {width}",
                    names.len()
                )));
            }
        }

        if n_classes == 2 && !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ArtifactError::Invalid(format!(
                "threshold {} must lie in (0, 1)",
                self.threshold
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// A validated linear model ready for prediction.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    model: ExportedLinearModel,
}

impl LinearClassifier {
    /// Wrap exported parameters after validating them.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` if the parameters are inconsistent.
    pub fn new(model: ExportedLinearModel) -> Result<Self, ArtifactError> {
        model.validate()?;
        Ok(Self { model })
    }

    fn check_row(&self, row: &PatientRecord) -> Result<(), ClassifierError> {
        if let Some(expected) = &self.model.feature_names {
            let got = row.column_names();
            if got.len() != expected.len() || got.iter().zip(expected).any(|(g, e)| *g != e.as_str()) {
                return Err(ClassifierError::SchemaMismatch(format!(
                    "The feature names should match those that were passed during fit. Expected {:?}, got {:?}",
                    expected, got
                )));
            }
        }

        let n = self.model.n_features();
        if row.values().len() != n {
            return Err(ClassifierError::SchemaMismatch(format!(
                "X has {} features, but the model is expecting {} features as input.",
                row.values().len(),
                n
            )));
        }
        Ok(())
    }

    fn decision(&self, values: &[i64]) -> Vec<f64> {
        self.model
            .coefficients
            .iter()
            .zip(&self.model.intercepts)
            .map(|(weights, intercept)| {
                weights
                    .iter()
                    .zip(values)
                    .fold(*intercept, |acc, (w, x)| acc + w * (*x as f64))
            })
            .collect()
    }

    fn predict_row(&self, row: &PatientRecord) -> Result<i64, ClassifierError> {
        self.check_row(row)?;
        let scores = self.decision(row.values());

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::Inference(
                "decision function is not finite".into(),
            ));
        }

        let idx = if scores.len() == 1 {
            usize::from(sigmoid(scores[0]) >= self.model.threshold)
        } else {
            scores
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &s)| {
                    if s > best.1 {
                        (i, s)
                    } else {
                        best
                    }
                })
                .0
        };
        Ok(self.model.classes[idx])
    }
}

impl Classifier for LinearClassifier {
    fn expected_columns(&self) -> Option<&[String]> {
        self.model.feature_names.as_deref()
    }

    fn predict(&self, rows: &[PatientRecord]) -> Result<Vec<i64>, ClassifierError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Loads [`LinearClassifier`] artifacts from JSON files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModelLoader;

impl JsonModelLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactLoader for JsonModelLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
        if !path.is_file() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let model: ExportedLinearModel = serde_json::from_slice(&bytes)
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;
        let classifier = LinearClassifier::new(model)?;

        tracing::info!(
            "Loaded model from {:?} (sha256={}, n_features={}, classes={:?}, named_columns={})",
            path,
            sha256_hex(&bytes),
            classifier.model.n_features(),
            classifier.model.classes,
            classifier.model.feature_names.is_some()
        );

        Ok(Arc::new(classifier))
    }
}
