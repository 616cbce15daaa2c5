//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the model artifact (file, network, format).

mod artifact;
mod classifier;

pub use artifact::{ArtifactError, ArtifactFetcher, ArtifactLoader};
pub use classifier::{Classifier, ClassifierError};
