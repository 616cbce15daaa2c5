//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `linear`: JSON-exported linear classifier (serde_json)
//! - `remote`: artifact download over HTTP (reqwest)
//! - `sanitize`: credential and PII filtering for logs

pub mod linear;
pub mod remote;
pub mod sanitize;
