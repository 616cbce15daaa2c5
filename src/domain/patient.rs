//! Patient input types for ART adherence prediction.
//!
//! Categorical answers are kept as the labels the form offers and encoded
//! through closed lookup tables when a record is assembled.

use serde::{Deserialize, Serialize};

/// Closed lookup table from a categorical label to its model code.
pub type CategoryMap = &'static [(&'static str, i64)];

/// Code used for any label outside a lookup table's domain.
pub const UNMAPPED_CODE: i64 = -1;

/// Sex: Male = 0, Female = 1.
pub const SEX_MAPPING: CategoryMap = &[("Male", 0), ("Female", 1)];

/// Target group: FSW = 0, MSM = 1, PWID = 2, Others = 3.
pub const TARGET_GROUP_MAPPING: CategoryMap =
    &[("FSW", 0), ("MSM", 1), ("PWID", 2), ("Others", 3)];

/// Current ART status: Active = 0, IIT = 1.
pub const ART_STATUS_MAPPING: CategoryMap = &[("Active", 0), ("IIT", 1)];

/// Lowest upper bound accepted for age.
pub const MIN_AGE_LIMIT: u32 = 100;

/// Highest upper bound accepted for age.
pub const MAX_AGE_LIMIT: u32 = 120;

/// Encode a categorical label through its lookup table.
///
/// Labels outside the table's domain resolve to [`UNMAPPED_CODE`]; this
/// never fails.
#[must_use]
pub fn encode_categorical(value: &str, mapping: CategoryMap) -> i64 {
    mapping
        .iter()
        .find(|(label, _)| *label == value)
        .map_or(UNMAPPED_CODE, |(_, code)| *code)
}

/// Labels of a lookup table, in table order.
#[must_use]
pub fn category_labels(mapping: CategoryMap) -> Vec<&'static str> {
    mapping.iter().map(|(label, _)| *label).collect()
}

/// Values collected from the input surface for one request.
///
/// Counts are unsigned so negative values cannot be represented; the age
/// bound is checked by [`PatientInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInput {
    /// "Male" or "Female"
    pub sex: String,

    /// "FSW", "MSM", "PWID" or "Others"
    pub target_group: String,

    /// Age in years
    pub age: u32,

    /// "Active" or "IIT"
    pub current_art_status: String,

    /// Number of interruptions in treatment
    pub iit_count: u32,

    /// Number of drug refills
    pub refill_count: u32,

    /// Number of unsuppressed viral load results
    pub unsuppressed_count: u32,

    /// Number of viral load results on file
    pub result_count: u32,

    pub months_on_treatment: u32,

    pub months_since_last_pickup: u32,
}

impl Default for PatientInput {
    /// Form defaults: first option of every selector, zero for numbers.
    fn default() -> Self {
        Self {
            sex: SEX_MAPPING[0].0.to_string(),
            target_group: TARGET_GROUP_MAPPING[0].0.to_string(),
            age: 0,
            current_art_status: ART_STATUS_MAPPING[0].0.to_string(),
            iit_count: 0,
            refill_count: 0,
            unsuppressed_count: 0,
            result_count: 0,
            months_on_treatment: 0,
            months_since_last_pickup: 0,
        }
    }
}

impl PatientInput {
    #[must_use]
    pub fn sex_code(&self) -> i64 {
        encode_categorical(&self.sex, SEX_MAPPING)
    }

    #[must_use]
    pub fn target_group_code(&self) -> i64 {
        encode_categorical(&self.target_group, TARGET_GROUP_MAPPING)
    }

    #[must_use]
    pub fn art_status_code(&self) -> i64 {
        encode_categorical(&self.current_art_status, ART_STATUS_MAPPING)
    }

    /// Check the input-boundary constraints.
    ///
    /// Only the age bound needs checking; unknown categorical labels are
    /// accepted and encode to the sentinel.
    ///
    /// # Errors
    /// Returns every violated constraint as a message.
    pub fn validate(&self, max_age: u32) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.age > max_age {
            errors.push(format!("Age {} out of range [0, {}]", self.age, max_age));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
