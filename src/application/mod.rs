//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! model acquisition and the prediction request cycle.

mod acquisition;
mod prediction;

pub use acquisition::{AcquisitionStrategy, HandleState, LoadedModel, ModelProvider};
pub use prediction::{present, PredictionService, RequestOutcome};
