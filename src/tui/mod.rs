//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides:
//! - Patient data form (input surface)
//! - Prediction result view (output surface)

mod app;
mod styles;
mod ui;

pub use app::{AdherenceService, App};
pub use styles::ClinicTheme;
