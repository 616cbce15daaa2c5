//! Prediction service: One request cycle from form values to a message.
//!
//! acquire → assemble → predict → present. Every failure ends the current
//! request only; [`PredictionService::handle_request`] never returns an error.

use std::sync::Arc;

use crate::domain::{OutcomeMessage, PatientInput, PatientRecord, Prediction};
use crate::ports::{ArtifactFetcher, ArtifactLoader};
use crate::AdherenceError;

use super::acquisition::{HandleState, LoadedModel, ModelProvider};

/// Message for one request plus the record sent to the model, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub message: OutcomeMessage,
    pub record: Option<PatientRecord>,
}

/// Runs prediction requests against the memoized model handle.
pub struct PredictionService<L, F>
where
    L: ArtifactLoader,
    F: ArtifactFetcher,
{
    provider: Arc<ModelProvider<L, F>>,
    max_age: u32,
    show_raw_label: bool,
}

impl<L, F> PredictionService<L, F>
where
    L: ArtifactLoader,
    F: ArtifactFetcher,
{
    pub fn new(provider: Arc<ModelProvider<L, F>>, max_age: u32, show_raw_label: bool) -> Self {
        Self {
            provider,
            max_age,
            show_raw_label,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &ModelProvider<L, F> {
        &self.provider
    }

    #[must_use]
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    fn loaded_model(&self) -> Result<&LoadedModel, AdherenceError> {
        match self.provider.acquire()? {
            HandleState::Ready(model) => Ok(model),
            HandleState::Absent { reason } | HandleState::Failed { reason } => {
                Err(AdherenceError::ModelNotLoaded(reason.clone()))
            }
        }
    }

    /// Validate the input and assemble the record the model expects.
    ///
    /// # Errors
    /// Returns `Validation` for out-of-range input, `ModelNotLoaded` when no
    /// handle is available and `SchemaMismatch` when the model's columns
    /// cannot be supplied.
    pub fn assemble(&self, input: &PatientInput) -> Result<PatientRecord, AdherenceError> {
        input
            .validate(self.max_age)
            .map_err(|errors| AdherenceError::Validation(errors.join(", ")))?;

        let model = self.loaded_model()?;
        let schema = model
            .schema()
            .map_err(|e| AdherenceError::SchemaMismatch(e.to_string()))?;

        Ok(PatientRecord::assemble(input, schema))
    }

    /// Run one prediction.
    ///
    /// # Errors
    /// Everything [`PredictionService::assemble`] returns, plus
    /// `SchemaMismatch`/`Inference` raised by the classifier itself.
    pub fn predict(&self, input: &PatientInput) -> Result<Prediction, AdherenceError> {
        let record = self.assemble(input)?;
        self.predict_record(&record)
    }

    fn predict_record(&self, record: &PatientRecord) -> Result<Prediction, AdherenceError> {
        let model = self.loaded_model()?;

        tracing::debug!("Assembled record with columns {:?}", record.column_names());

        let labels = model.classifier().predict(std::slice::from_ref(record))?;
        let label = labels.first().copied().ok_or_else(|| {
            AdherenceError::Inference("model returned no predictions".to_string())
        })?;

        let prediction = Prediction::new(label);
        tracing::info!(
            "Prediction complete: label={}, outcome={}",
            prediction.label,
            prediction.outcome()
        );
        Ok(prediction)
    }

    /// Run one request and turn its result into the message to show.
    ///
    /// The record is returned whenever assembly succeeded, even if the
    /// model then rejected it.
    #[must_use]
    pub fn handle_request(&self, input: &PatientInput) -> RequestOutcome {
        let (result, record) = match self.assemble(input) {
            Ok(record) => (self.predict_record(&record), Some(record)),
            Err(e) => (Err(e), None),
        };
        if let Err(e) = &result {
            tracing::warn!("Prediction request failed: {}", e);
        }
        RequestOutcome {
            message: present(&result, self.show_raw_label),
            record,
        }
    }
}

/// Map a prediction result to its user-facing message.
#[must_use]
pub fn present(result: &Result<Prediction, AdherenceError>, show_raw_label: bool) -> OutcomeMessage {
    match result {
        Ok(prediction) => OutcomeMessage::for_prediction(prediction, show_raw_label),
        Err(AdherenceError::ModelNotLoaded(_)) => OutcomeMessage::model_not_loaded(),
        Err(AdherenceError::SchemaMismatch(cause)) | Err(AdherenceError::Inference(cause)) => {
            OutcomeMessage::prediction_error(cause)
        }
        Err(AdherenceError::Validation(reasons)) => OutcomeMessage::invalid_input(reasons),
        Err(AdherenceError::ModelLoad(cause)) => OutcomeMessage::load_error(cause),
        Err(other) => OutcomeMessage::prediction_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::acquisition::test_support::*;
    use crate::application::AcquisitionStrategy;
    use crate::domain::{
        MessageKind, RecordSchema, MODEL_NOT_LOADED_MESSAGE, NEEDS_ASSESSMENT_MESSAGE,
        SUPPRESSED_MESSAGE,
    };
    use crate::ports::{ArtifactError, Classifier, ClassifierError};
    use std::path::{Path, PathBuf};

    type TestService = PredictionService<Arc<CountingLoader>, StubFetcher>;

    fn sample_input() -> PatientInput {
        PatientInput {
            sex: "Female".into(),
            target_group: "PWID".into(),
            age: 34,
            current_art_status: "Active".into(),
            iit_count: 1,
            refill_count: 6,
            unsuppressed_count: 0,
            result_count: 3,
            months_on_treatment: 12,
            months_since_last_pickup: 1,
        }
    }

    fn service_with(
        strategy: AcquisitionStrategy,
        loader: Arc<CountingLoader>,
        fetch_fails: bool,
        prefer_model_columns: bool,
    ) -> TestService {
        let provider = ModelProvider::new(
            strategy,
            loader,
            StubFetcher::new(fetch_fails),
            RecordSchema::full(),
            prefer_model_columns,
        );
        PredictionService::new(Arc::new(provider), 100, false)
    }

    fn local() -> AcquisitionStrategy {
        AcquisitionStrategy::LocalFile {
            path: PathBuf::from("model.json"),
        }
    }

    #[test]
    fn test_full_request_cycle() {
        let clf = Arc::new(FixedClassifier::new(1, None));
        let loader = Arc::new(CountingLoader::ok(clf.clone()));
        let service = service_with(local(), loader, false, true);

        let outcome = service.handle_request(&sample_input());
        assert_eq!(outcome.message.kind, MessageKind::Success);
        assert_eq!(outcome.message.text, SUPPRESSED_MESSAGE);
        let record = outcome.record.expect("record");
        assert_eq!(record.values(), &[1, 2, 34, 0, 1, 6, 0, 3, 12, 1]);

        let seen = clf.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].column_names(),
            vec![
                "Sex",
                "Target group",
                "Age",
                "Current ART Status",
                "IIT Count",
                "Refill Count",
                "Unsuppressed Count",
                "Result_Count",
                "Months on Treatment",
                "Months Since Last Pickup",
            ]
        );
        assert_eq!(seen[0].values(), &[1, 2, 34, 0, 1, 6, 0, 3, 12, 1]);
    }

    #[test]
    fn test_unsuppressed_label_needs_assessment() {
        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(0, None))));
        let service = service_with(local(), loader, false, true);

        let message = service.handle_request(&sample_input()).message;
        assert_eq!(message.kind, MessageKind::Warning);
        assert_eq!(message.text, NEEDS_ASSESSMENT_MESSAGE);

        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(3, None))));
        let service = service_with(local(), loader, false, true);
        assert_eq!(service.handle_request(&sample_input()).message.kind, MessageKind::Warning);
    }

    #[test]
    fn test_absent_handle_reports_model_not_loaded() {
        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(1, None))));
        let strategy = AcquisitionStrategy::RemoteFetch {
            url: "https://example.org/model.json".into(),
            path: PathBuf::from("model.json"),
        };
        let service = service_with(strategy, loader, true, true);

        let result = service.predict(&sample_input());
        assert!(matches!(result, Err(AdherenceError::ModelNotLoaded(_))));

        let message = service.handle_request(&sample_input()).message;
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, MODEL_NOT_LOADED_MESSAGE);
    }

    #[test]
    fn test_unknown_model_columns_report_cause() {
        let columns = vec!["Age".to_string(), "Viral Load".to_string()];
        let clf = Arc::new(FixedClassifier::new(1, Some(columns)));
        let service = service_with(local(), Arc::new(CountingLoader::ok(clf.clone())), false, true);

        let message = service.handle_request(&sample_input()).message;
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.starts_with("Error making prediction: "));
        assert!(message.text.contains("Viral Load"));
        assert!(clf.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_classifier_mismatch_reports_cause() {
        // Model columns are ignored, so the full schema is sent and rejected.
        let columns = vec!["Age".to_string(), "Sex".to_string()];
        let clf = Arc::new(FixedClassifier::new(1, Some(columns)));
        let service = service_with(local(), Arc::new(CountingLoader::ok(clf)), false, false);

        let result = service.predict(&sample_input());
        assert!(matches!(result, Err(AdherenceError::SchemaMismatch(_))));

        let message = service.handle_request(&sample_input()).message;
        assert!(message.text.starts_with("Error making prediction: expected"));

        // The service stays usable for the next request.
        let again = service.handle_request(&sample_input()).message;
        assert_eq!(again, message);
    }

    #[test]
    fn test_invalid_input_skips_model() {
        let clf = Arc::new(FixedClassifier::new(1, None));
        let loader = Arc::new(CountingLoader::ok(clf.clone()));
        let service = service_with(local(), loader, false, true);

        let input = PatientInput {
            age: 130,
            ..sample_input()
        };
        let message = service.handle_request(&input).message;
        assert!(message.text.starts_with("Invalid input: Age 130"));
        assert!(clf.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_acquisition_runs_once_across_requests() {
        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(1, None))));
        let service = service_with(local(), loader.clone(), false, true);

        for _ in 0..10 {
            let _ = service.handle_request(&sample_input()).message;
        }
        assert_eq!(loader.calls(), 1);
    }

    #[test]
    fn test_failed_remote_acquisition_is_not_retried() {
        let loader = Arc::new(CountingLoader::failing());
        let strategy = AcquisitionStrategy::RemoteFetch {
            url: "https://example.org/model.json".into(),
            path: PathBuf::from("model.json"),
        };
        let service = service_with(strategy, loader.clone(), false, true);

        for _ in 0..4 {
            assert_eq!(
                service.handle_request(&sample_input()).message.text,
                MODEL_NOT_LOADED_MESSAGE
            );
        }
        assert_eq!(loader.calls(), 1);
    }

    #[test]
    fn test_raw_label_is_appended_when_enabled() {
        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(1, None))));
        let provider = ModelProvider::new(
            local(),
            loader,
            StubFetcher::new(false),
            RecordSchema::full(),
            true,
        );
        let service = PredictionService::new(Arc::new(provider), 100, true);

        let message = service.handle_request(&sample_input()).message;
        assert_eq!(
            message.text,
            format!("{SUPPRESSED_MESSAGE} Predicted Outcome: 1")
        );
    }

    /// Classifier that answers every batch with no labels.
    struct EmptyClassifier;

    impl Classifier for EmptyClassifier {
        fn expected_columns(&self) -> Option<&[String]> {
            None
        }

        fn predict(&self, _rows: &[PatientRecord]) -> Result<Vec<i64>, ClassifierError> {
            Ok(vec![])
        }
    }

    struct EmptyLoader;

    impl ArtifactLoader for EmptyLoader {
        fn load(&self, _path: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
            Ok(Arc::new(EmptyClassifier))
        }
    }

    #[test]
    fn test_empty_prediction_is_an_inference_error() {
        let provider = ModelProvider::new(
            local(),
            EmptyLoader,
            StubFetcher::new(false),
            RecordSchema::full(),
            true,
        );
        let service = PredictionService::new(Arc::new(provider), 100, false);

        let result = service.predict(&sample_input());
        assert!(matches!(result, Err(AdherenceError::Inference(_))));

        let outcome = service.handle_request(&sample_input());
        assert_eq!(outcome.message.kind, MessageKind::Error);
        assert_eq!(
            outcome.message.text,
            "Error making prediction: model returned no predictions"
        );
        assert!(outcome.record.is_some());
    }

    #[test]
    fn test_invalid_input_returns_no_record() {
        let loader = Arc::new(CountingLoader::ok(Arc::new(FixedClassifier::new(1, None))));
        let service = service_with(local(), loader, false, true);

        let input = PatientInput {
            age: 101,
            ..sample_input()
        };
        assert!(service.handle_request(&input).record.is_none());
    }

    #[test]
    fn test_present_maps_every_error() {
        let msg = present(&Err(AdherenceError::Inference("empty".into())), false);
        assert_eq!(msg.text, "Error making prediction: empty");

        let msg = present(&Err(AdherenceError::ModelLoad("corrupt".into())), false);
        assert_eq!(msg.text, "Error loading model: corrupt");
    }
}
