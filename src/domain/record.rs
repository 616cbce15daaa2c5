//! Record schema and single-row record assembly.
//!
//! The column names are the headers the classifier was fit on and must be
//! reproduced verbatim, including the odd `Result_Count`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::patient::PatientInput;

/// A feature column the input surface can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Sex")]
    Sex,
    #[serde(rename = "Target group")]
    TargetGroup,
    #[serde(rename = "Age")]
    Age,
    #[serde(rename = "Current ART Status")]
    CurrentArtStatus,
    #[serde(rename = "IIT Count")]
    IitCount,
    #[serde(rename = "Refill Count")]
    RefillCount,
    #[serde(rename = "Unsuppressed Count")]
    UnsuppressedCount,
    #[serde(rename = "Result_Count")]
    ResultCount,
    #[serde(rename = "Months on Treatment")]
    MonthsOnTreatment,
    #[serde(rename = "Months Since Last Pickup")]
    MonthsSinceLastPickup,
}

impl Column {
    /// All columns in canonical order.
    pub const ALL: [Column; 10] = [
        Column::Sex,
        Column::TargetGroup,
        Column::Age,
        Column::CurrentArtStatus,
        Column::IitCount,
        Column::RefillCount,
        Column::UnsuppressedCount,
        Column::ResultCount,
        Column::MonthsOnTreatment,
        Column::MonthsSinceLastPickup,
    ];

    /// Header name as seen by the classifier.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sex => "Sex",
            Self::TargetGroup => "Target group",
            Self::Age => "Age",
            Self::CurrentArtStatus => "Current ART Status",
            Self::IitCount => "IIT Count",
            Self::RefillCount => "Refill Count",
            Self::UnsuppressedCount => "Unsuppressed Count",
            Self::ResultCount => "Result_Count",
            Self::MonthsOnTreatment => "Months on Treatment",
            Self::MonthsSinceLastPickup => "Months Since Last Pickup",
        }
    }

    /// Look up a column by its exact header name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Encoded value of this column for the given input.
    #[must_use]
    pub fn value_of(self, input: &PatientInput) -> i64 {
        match self {
            Self::Sex => input.sex_code(),
            Self::TargetGroup => input.target_group_code(),
            Self::Age => i64::from(input.age),
            Self::CurrentArtStatus => input.art_status_code(),
            Self::IitCount => i64::from(input.iit_count),
            Self::RefillCount => i64::from(input.refill_count),
            Self::UnsuppressedCount => i64::from(input.unsuppressed_count),
            Self::ResultCount => i64::from(input.result_count),
            Self::MonthsOnTreatment => i64::from(input.months_on_treatment),
            Self::MonthsSinceLastPickup => i64::from(input.months_since_last_pickup),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while resolving a schema against a classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("model expects no columns")]
    Empty,

    #[error("model expects unknown column(s): {0}")]
    UnknownColumns(String),

    #[error("model expects column {0:?} more than once")]
    Duplicate(String),
}

/// Ordered list of columns a record carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    columns: Vec<Column>,
}

impl RecordSchema {
    /// All ten columns in canonical order.
    #[must_use]
    pub fn full() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }

    /// The four-column variant.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            columns: vec![
                Column::Age,
                Column::CurrentArtStatus,
                Column::UnsuppressedCount,
                Column::MonthsOnTreatment,
            ],
        }
    }

    /// Build a schema from a classifier's training column list, keeping its order.
    ///
    /// # Errors
    /// Fails if the list is empty, repeats a column, or names a column the
    /// input surface does not collect.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut columns = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match Column::from_name(name) {
                Some(col) if columns.contains(&col) => {
                    return Err(SchemaError::Duplicate(name.to_string()));
                }
                Some(col) => columns.push(col),
                None => unknown.push(format!("{name:?}")),
            }
        }

        if !unknown.is_empty() {
            return Err(SchemaError::UnknownColumns(unknown.join(", ")));
        }
        Ok(Self { columns })
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Header names in schema order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

/// One immutable row handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    columns: Vec<Column>,
    values: Vec<i64>,
}

impl PatientRecord {
    /// Assemble a record with exactly the schema's columns, in schema order.
    #[must_use]
    pub fn assemble(input: &PatientInput, schema: &RecordSchema) -> Self {
        let values = schema.columns().iter().map(|c| c.value_of(input)).collect();
        Self {
            columns: schema.columns().to_vec(),
            values,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Header names in record order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    #[cfg(test)]
    fn get(&self, column: Column) -> Option<i64> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }
}
