//! Runtime configuration read from the process environment.

use std::path::PathBuf;

use crate::domain::{RecordSchema, MAX_AGE_LIMIT, MIN_AGE_LIMIT};
use crate::AdherenceError;

const DEFAULT_MODEL_PATH: &str = "model.json";
const DEFAULT_LOG_FILE: &str = "arv-adherence.log";

/// How the model handle is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// Load the artifact already on disk; failure aborts startup.
    Local,
    /// Download from `url` first; failure leaves the app running without a model.
    Remote { url: String },
}

/// Where the record schema comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// Use the model's own column list, falling back to the full schema.
    Artifact,
    Full,
    Compact,
}

impl SchemaSource {
    /// Schema used when the model does not name its columns.
    #[must_use]
    pub fn fallback(self) -> RecordSchema {
        match self {
            Self::Compact => RecordSchema::compact(),
            Self::Artifact | Self::Full => RecordSchema::full(),
        }
    }

    /// Whether the model's own column list takes precedence.
    #[must_use]
    pub fn prefers_artifact(self) -> bool {
        matches!(self, Self::Artifact)
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
}

/// Snapshot of configuration values used by the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub acquisition: AcquisitionMode,
    pub schema_source: SchemaSource,
    pub max_age: u32,
    pub show_raw_label: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Fallbacks taken while reading the environment, logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            acquisition: AcquisitionMode::Local,
            schema_source: SchemaSource::Artifact,
            max_age: MIN_AGE_LIMIT,
            show_raw_label: true,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            warnings: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `AdherenceError::Config` if remote acquisition is requested
    /// without a URL.
    pub fn from_env() -> Result<Self, AdherenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    ///
    /// Unrecognised values fall back to their defaults and are recorded in
    /// [`AppConfig::warnings`].
    ///
    /// # Errors
    /// Returns `AdherenceError::Config` if remote acquisition is requested
    /// without a URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdherenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut warnings = Vec::new();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model_path = var("ARV_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);
        let url = var("ARV_MODEL_URL");

        let mode = var("ARV_ACQUISITION")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| "auto".to_string());
        let acquisition = match (mode.as_str(), url) {
            ("local", _) => AcquisitionMode::Local,
            ("remote", Some(url)) | ("auto", Some(url)) => AcquisitionMode::Remote { url },
            ("remote", None) => {
                return Err(AdherenceError::Config(
                    "ARV_ACQUISITION=remote requires ARV_MODEL_URL".to_string(),
                ));
            }
            ("auto", None) => AcquisitionMode::Local,
            (other, url) => {
                warnings.push(format!("Unknown ARV_ACQUISITION {other:?}, using auto"));
                match url {
                    Some(url) => AcquisitionMode::Remote { url },
                    None => AcquisitionMode::Local,
                }
            }
        };

        let schema_source = match var("ARV_SCHEMA").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("artifact") => SchemaSource::Artifact,
            Some("full") => SchemaSource::Full,
            Some("compact") => SchemaSource::Compact,
            Some(other) => {
                warnings.push(format!("Unknown ARV_SCHEMA {other:?}, using artifact"));
                SchemaSource::Artifact
            }
        };

        let max_age = match var("ARV_MAX_AGE") {
            None => defaults.max_age,
            Some(v) => match v.parse::<u32>() {
                Ok(age) => {
                    let clamped = age.clamp(MIN_AGE_LIMIT, MAX_AGE_LIMIT);
                    if clamped != age {
                        warnings.push(format!(
                            "ARV_MAX_AGE {age} outside {MIN_AGE_LIMIT}..={MAX_AGE_LIMIT}, using {clamped}"
                        ));
                    }
                    clamped
                }
                Err(_) => {
                    warnings.push(format!(
                        "Invalid ARV_MAX_AGE {v:?}, using {}",
                        defaults.max_age
                    ));
                    defaults.max_age
                }
            },
        };

        let show_raw_label = match var("ARV_SHOW_RAW_LABEL") {
            None => defaults.show_raw_label,
            Some(v) => parse_bool(&v).unwrap_or_else(|| {
                warnings.push(format!(
                    "Invalid ARV_SHOW_RAW_LABEL {v:?}, using {}",
                    defaults.show_raw_label
                ));
                defaults.show_raw_label
            }),
        };

        let log_mode = match var("ARV_LOG_MODE").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("auto") => LogMode::Auto,
            Some("file") => LogMode::File,
            Some("stdout") => LogMode::Stdout,
            Some(other) => {
                warnings.push(format!("Unknown ARV_LOG_MODE {other:?}, using auto"));
                LogMode::Auto
            }
        };
        let log_file = var("ARV_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        Ok(Self {
            model_path,
            acquisition,
            schema_source,
            max_age,
            show_raw_label,
            log_mode,
            log_file,
            warnings,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AdherenceError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config_from(&[]).expect("defaults");
        assert_eq!(cfg.model_path, PathBuf::from("model.json"));
        assert_eq!(cfg.acquisition, AcquisitionMode::Local);
        assert_eq!(cfg.schema_source, SchemaSource::Artifact);
        assert_eq!(cfg.max_age, 100);
        assert!(cfg.show_raw_label);
        assert_eq!(cfg.log_mode, LogMode::Auto);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn test_url_selects_remote_in_auto_mode() {
        let cfg = config_from(&[("ARV_MODEL_URL", "https://example.org/model.json")])
            .expect("config");
        assert_eq!(
            cfg.acquisition,
            AcquisitionMode::Remote {
                url: "https://example.org/model.json".into()
            }
        );

        let cfg = config_from(&[
            ("ARV_MODEL_URL", "https://example.org/model.json"),
            ("ARV_ACQUISITION", "local"),
        ])
        .expect("config");
        assert_eq!(cfg.acquisition, AcquisitionMode::Local);
    }

    #[test]
    fn test_remote_without_url_is_an_error() {
        let err = config_from(&[("ARV_ACQUISITION", "remote")]).unwrap_err();
        assert!(matches!(err, AdherenceError::Config(_)));
    }

    #[test]
    fn test_parsed_values() {
        let cfg = config_from(&[
            ("ARV_SCHEMA", "Compact"),
            ("ARV_MAX_AGE", "150"),
            ("ARV_SHOW_RAW_LABEL", "no"),
            ("ARV_LOG_MODE", "stdout"),
        ])
        .expect("config");
        assert_eq!(cfg.schema_source, SchemaSource::Compact);
        assert_eq!(cfg.schema_source.fallback(), RecordSchema::compact());
        assert_eq!(cfg.max_age, 120);
        assert!(!cfg.show_raw_label);
        assert_eq!(cfg.log_mode, LogMode::Stdout);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = config_from(&[("ARV_SCHEMA", "wide"), ("ARV_MAX_AGE", "old")]).expect("config");
        assert_eq!(cfg.schema_source, SchemaSource::Artifact);
        assert_eq!(cfg.max_age, 100);
        assert_eq!(cfg.warnings.len(), 2);
        assert!(cfg.warnings[0].contains("ARV_SCHEMA"));
        assert!(cfg.warnings[1].contains("ARV_MAX_AGE"));
    }

    #[test]
    fn test_raw_label_flag_is_case_insensitive() {
        for value in ["True", "YES", "1"] {
            let cfg = config_from(&[("ARV_SHOW_RAW_LABEL", value)]).expect("config");
            assert!(cfg.show_raw_label, "{value}");
            assert!(cfg.warnings.is_empty());
        }
        for value in ["False", "No", "0"] {
            let cfg = config_from(&[("ARV_SHOW_RAW_LABEL", value)]).expect("config");
            assert!(!cfg.show_raw_label, "{value}");
        }
    }

    #[test]
    fn test_unknown_raw_label_keeps_default() {
        for value in ["on", "enabled"] {
            let cfg = config_from(&[("ARV_SHOW_RAW_LABEL", value)]).expect("config");
            assert!(cfg.show_raw_label, "{value}");
            assert_eq!(cfg.warnings.len(), 1);
            assert!(cfg.warnings[0].contains("ARV_SHOW_RAW_LABEL"));
        }
    }

    #[test]
    fn test_log_mode_is_case_insensitive() {
        let cfg = config_from(&[("ARV_LOG_MODE", "FILE")]).expect("config");
        assert_eq!(cfg.log_mode, LogMode::File);

        let cfg = config_from(&[("ARV_LOG_MODE", "syslog")]).expect("config");
        assert_eq!(cfg.log_mode, LogMode::Auto);
        assert!(cfg.warnings[0].contains("ARV_LOG_MODE"));
    }

    #[test]
    fn test_out_of_range_age_bound_is_clamped_with_warning() {
        let cfg = config_from(&[("ARV_MAX_AGE", "50")]).expect("config");
        assert_eq!(cfg.max_age, 100);
        assert_eq!(cfg.warnings.len(), 1);
    }
}
