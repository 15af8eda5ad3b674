//! Patient models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower bound (exclusive) for a patient's age.
pub const MIN_AGE_EXCLUSIVE: i64 = 0;
/// Upper bound (exclusive) for a patient's age.
pub const MAX_AGE_EXCLUSIVE: i64 = 120;

/// Field constraint violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("age must be greater than 0 and less than 120, got {0}")]
    AgeOutOfRange(i64),

    #[error("height must be greater than 0, got {0}")]
    InvalidHeight(f64),

    #[error("weight must be greater than 0, got {0}")]
    InvalidWeight(f64),

    #[error("gender must be one of 'male', 'female', 'other', got '{0}'")]
    InvalidGender(String),
}

/// Patient gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::InvalidGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight category derived from BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obesity,
}

impl WeightCategory {
    /// Classify a (rounded) BMI value.
    ///
    /// The bands are half-open and leave gaps at `[24.9, 25)` and
    /// `[29.9, ..)`: anything not matched by the first three bands is
    /// `Obesity`, so a BMI of 24.95 classifies as `Obesity`.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            WeightCategory::Underweight
        } else if (18.5..24.9).contains(&bmi) {
            WeightCategory::NormalWeight
        } else if (25.0..29.9).contains(&bmi) {
            WeightCategory::Overweight
        } else {
            WeightCategory::Obesity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightCategory::Underweight => "Underweight",
            WeightCategory::NormalWeight => "Normal weight",
            WeightCategory::Overweight => "Overweight",
            WeightCategory::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for WeightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to two decimal places, half-to-even on the exact binary value.
///
/// Scaling by 100 first can land a product exactly on a tie that the real
/// value is not on, so the digits come from the formatter instead.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Stored attributes of a patient, everything except the ID.
///
/// Derived values (`bmi`, `category`) are never stored here; any such keys in
/// an incoming document are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientFields {
    /// Patient name
    pub name: String,
    /// City of residence
    pub city: String,
    /// Age in years, 1 to 119
    pub age: i64,
    /// Gender
    pub gender: Gender,
    /// Height, used as-is in the BMI formula
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
}

impl PatientFields {
    /// Check every field constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.age <= MIN_AGE_EXCLUSIVE || self.age >= MAX_AGE_EXCLUSIVE {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }
        if !is_positive(self.height) {
            return Err(ValidationError::InvalidHeight(self.height));
        }
        if !is_positive(self.weight) {
            return Err(ValidationError::InvalidWeight(self.weight));
        }
        Ok(())
    }

    /// Body mass index: weight / height², rounded to two decimals.
    pub fn bmi(&self) -> f64 {
        round2(self.weight / (self.height * self.height))
    }

    pub fn category(&self) -> WeightCategory {
        WeightCategory::from_bmi(self.bmi())
    }
}

/// Serialized form of a record: stored fields plus derived values.
#[derive(Serialize)]
struct PatientFieldsView<'a> {
    name: &'a str,
    city: &'a str,
    age: i64,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    category: WeightCategory,
    verify: WeightCategory,
}

impl Serialize for PatientFields {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PatientFieldsView {
            name: &self.name,
            city: &self.city,
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi(),
            category: self.category(),
            verify: self.category(),
        }
        .serialize(serializer)
    }
}

/// A complete patient record, as accepted by create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique patient ID (e.g. "P001")
    pub id: String,
    #[serde(flatten)]
    pub fields: PatientFields,
}

impl Patient {
    /// Build a patient, rejecting values outside the field constraints.
    pub fn new(id: impl Into<String>, fields: PatientFields) -> Result<Self, ValidationError> {
        fields.validate()?;
        Ok(Self {
            id: id.into(),
            fields,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()
    }
}

/// Create payload.
///
/// Gender arrives as a plain string and is checked along with the other
/// constraints, so a duplicate ID is reported before any field error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: i64,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
}

impl NewPatient {
    /// Parse and validate into a stored record.
    pub fn into_patient(self) -> Result<Patient, ValidationError> {
        let gender = self.gender.parse::<Gender>()?;
        Patient::new(
            self.id,
            PatientFields {
                name: self.name,
                city: self.city,
                age: self.age,
                gender,
                height: self.height,
                weight: self.weight,
            },
        )
    }
}

impl From<Patient> for NewPatient {
    fn from(patient: Patient) -> Self {
        let PatientFields {
            name,
            city,
            age,
            gender,
            height,
            weight,
        } = patient.fields;
        Self {
            id: patient.id,
            name,
            city,
            age,
            gender: gender.as_str().to_string(),
            height,
            weight,
        }
    }
}

/// A partial update: only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PatientUpdate::default()
    }

    /// Merge onto `current` and validate the result as a full record.
    pub fn apply(&self, current: &PatientFields) -> Result<PatientFields, ValidationError> {
        let merged = PatientFields {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            city: self.city.clone().unwrap_or_else(|| current.city.clone()),
            age: self.age.unwrap_or(current.age),
            gender: self.gender.unwrap_or(current.gender),
            height: self.height.unwrap_or(current.height),
            weight: self.weight.unwrap_or(current.weight),
        };
        merged.validate()?;
        Ok(merged)
    }
}
