//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O: patient input, categorical encoding, record
//! assembly and outcome messages.

mod outcome;
mod patient;
mod record;

pub use outcome::{
    MessageKind, Outcome, OutcomeMessage, Prediction, MODEL_NOT_LOADED_MESSAGE,
    NEEDS_ASSESSMENT_MESSAGE, SUPPRESSED_LABEL, SUPPRESSED_MESSAGE,
};
pub use patient::{
    category_labels, encode_categorical, CategoryMap, PatientInput, ART_STATUS_MAPPING,
    MAX_AGE_LIMIT, MIN_AGE_LIMIT, SEX_MAPPING, TARGET_GROUP_MAPPING, UNMAPPED_CODE,
};
pub use record::{Column, PatientRecord, RecordSchema, SchemaError};
