//! Prediction outcome types and the messages shown for them.

use serde::{Deserialize, Serialize};

/// Label the classifier emits for a virally suppressed client.
pub const SUPPRESSED_LABEL: i64 = 1;

/// Shown when a prediction is requested but no model handle is available.
pub const MODEL_NOT_LOADED_MESSAGE: &str =
    "Model is not loaded. Please check the model artifact and reload the app.";

pub const SUPPRESSED_MESSAGE: &str = "The client is likely to be virally suppressed.";

pub const NEEDS_ASSESSMENT_MESSAGE: &str =
    "The client is likely to be unsuppressed and needs further assessment.";

/// Clinical reading of a predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Viral load expected to be suppressed
    Suppressed,
    /// Unsuppressed or otherwise needs follow-up
    NeedsAssessment,
}

impl Outcome {
    /// Map a raw label; anything other than [`SUPPRESSED_LABEL`] needs assessment.
    #[must_use]
    pub fn from_label(label: i64) -> Self {
        if label == SUPPRESSED_LABEL {
            Self::Suppressed
        } else {
            Self::NeedsAssessment
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Suppressed => SUPPRESSED_MESSAGE,
            Self::NeedsAssessment => NEEDS_ASSESSMENT_MESSAGE,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suppressed => write!(f, "SUPPRESSED"),
            Self::NeedsAssessment => write!(f, "NEEDS ASSESSMENT"),
        }
    }
}

/// Raw classifier output for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// First (only) label returned for the single-row record
    pub label: i64,

    pub predicted_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    #[must_use]
    pub fn new(label: i64) -> Self {
        Self {
            label,
            predicted_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::from_label(self.label)
    }
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Success,
    Warning,
    Error,
    /// Startup cannot continue
    Fatal,
}

/// The single textual message produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl OutcomeMessage {
    /// Message for a successful prediction.
    #[must_use]
    pub fn for_prediction(prediction: &Prediction, show_raw_label: bool) -> Self {
        let outcome = prediction.outcome();
        let kind = match outcome {
            Outcome::Suppressed => MessageKind::Success,
            Outcome::NeedsAssessment => MessageKind::Warning,
        };
        let text = if show_raw_label {
            format!(
                "{} Predicted Outcome: {}",
                outcome.description(),
                prediction.label
            )
        } else {
            outcome.description().to_string()
        };
        Self { kind, text }
    }

    #[must_use]
    pub fn model_not_loaded() -> Self {
        Self {
            kind: MessageKind::Error,
            text: MODEL_NOT_LOADED_MESSAGE.to_string(),
        }
    }

    /// Failure while running the classifier, with its underlying cause.
    #[must_use]
    pub fn prediction_error(cause: impl std::fmt::Display) -> Self {
        Self {
            kind: MessageKind::Error,
            text: format!("Error making prediction: {cause}"),
        }
    }

    #[must_use]
    pub fn invalid_input(reasons: impl std::fmt::Display) -> Self {
        Self {
            kind: MessageKind::Error,
            text: format!("Invalid input: {reasons}"),
        }
    }

    /// Model acquisition failed in a way the remote strategy tolerates.
    #[must_use]
    pub fn load_error(cause: impl std::fmt::Display) -> Self {
        Self {
            kind: MessageKind::Error,
            text: format!("Error loading model: {cause}"),
        }
    }

    #[must_use]
    pub fn fatal(cause: impl std::fmt::Display) -> Self {
        Self {
            kind: MessageKind::Fatal,
            text: format!("Failed to start: {cause}"),
        }
    }
}

impl std::fmt::Display for OutcomeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
