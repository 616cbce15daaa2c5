//! # ARV Adherence
//!
//! Viral-suppression prediction for clients on antiretroviral therapy.
//!
//! This crate provides:
//! - One-time acquisition of a trained classifier (local file or download)
//! - Assembly of the model's input record from patient fields
//! - A prediction request cycle that always ends in a user-facing message
//! - Terminal UI for entering patient values
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientInput, PatientRecord, Outcome)
//! - `ports`: Trait definitions for the classifier and artifact access
//! - `adapters`: Concrete implementations (JSON linear model, HTTP fetch, log sanitizer)
//! - `application`: Acquisition and the prediction service
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{OutcomeMessage, PatientInput, PatientRecord, Prediction};

/// Result type for adherence operations
pub type Result<T> = std::result::Result<T, AdherenceError>;

/// Main error type for adherence operations
#[derive(Debug, thiserror::Error)]
pub enum AdherenceError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("{0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    Inference(String),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ports::ClassifierError> for AdherenceError {
    fn from(err: ports::ClassifierError) -> Self {
        match err {
            ports::ClassifierError::SchemaMismatch(cause) => Self::SchemaMismatch(cause),
            ports::ClassifierError::Inference(cause) => Self::Inference(cause),
        }
    }
}
