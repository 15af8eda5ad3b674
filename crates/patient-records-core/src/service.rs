//! Patient operations over an injected store.
//!
//! [`PatientService`] is stateless apart from its write lock: every call goes
//! back to the store. All mutations are serialized through a single-writer
//! mutex so check-then-write sequences (duplicate ID on create, existence on
//! update and delete) cannot interleave.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    Collection, NewPatient, Patient, PatientFields, PatientUpdate, ValidationError,
};
use crate::store::{PatientStore, StoreError};

/// Service errors, one per response class.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    fn patient_not_found() -> Self {
        ServiceError::NotFound("Patient not found".to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =========================================================================
// Sorting
// =========================================================================

/// Fields the collection can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Height, SortField::Weight, SortField::Bmi];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }

    fn key(&self, fields: &PatientFields) -> f64 {
        match self {
            SortField::Height => fields.height,
            SortField::Weight => fields.weight,
            SortField::Bmi => fields.bmi(),
        }
    }
}

impl FromStr for SortField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<String> = SortField::ALL
                    .iter()
                    .map(|f| format!("'{}'", f.as_str()))
                    .collect();
                ServiceError::InvalidArgument(format!(
                    "Invalid field select from [{}]",
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ServiceError::InvalidArgument(
                "Invalid order select between asc and desc".to_string(),
            )),
        }
    }
}

/// Stable sort; equal keys keep collection order in both directions.
pub fn sort_patients(patients: &mut [Patient], field: SortField, order: SortOrder) {
    patients.sort_by(|a, b| {
        let ordering = field.key(&a.fields).total_cmp(&field.key(&b.fields));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

// =========================================================================
// Service
// =========================================================================

pub struct PatientService {
    store: Arc<dyn PatientStore>,
    write_lock: Mutex<()>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The lock guards no data, so a writer that panicked leaves nothing to
    /// repair and the poison flag is ignored.
    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The full collection.
    pub fn view(&self) -> ServiceResult<Collection> {
        Ok(self.store.load()?)
    }

    /// Look up a patient by ID.
    pub fn search(&self, id: &str) -> ServiceResult<Patient> {
        self.store
            .get(id)?
            .ok_or_else(ServiceError::patient_not_found)
    }

    /// All patients ordered by `sort_by`.
    ///
    /// The field is validated before the order, and both before any I/O.
    pub fn sort(&self, sort_by: &str, order: &str) -> ServiceResult<Vec<Patient>> {
        let field: SortField = sort_by.parse()?;
        let order: SortOrder = order.parse()?;

        let mut patients = self.store.load()?.into_vec();
        sort_patients(&mut patients, field, order);
        Ok(patients)
    }

    /// Store a new patient. The ID must not exist yet.
    ///
    /// The duplicate check runs before field validation, so an existing ID is
    /// a conflict whatever the other fields hold.
    pub fn create(&self, patient: impl Into<NewPatient>) -> ServiceResult<()> {
        let new = patient.into();
        let _guard = self.write_guard();

        if self.store.get(&new.id)?.is_some() {
            warn!(patient_id = %new.id, "rejected create for existing patient ID");
            return Err(ServiceError::Conflict("Patient ID already exists".to_string()));
        }
        let patient = new.into_patient()?;

        self.store.put(&patient)?;
        info!(patient_id = %patient.id, "patient created");
        Ok(())
    }

    /// Merge a partial update onto an existing patient and re-validate.
    pub fn update(&self, id: &str, update: &PatientUpdate) -> ServiceResult<Patient> {
        let _guard = self.write_guard();

        let current = self
            .store
            .get(id)?
            .ok_or_else(ServiceError::patient_not_found)?;
        let patient = Patient {
            id: current.id,
            fields: update.apply(&current.fields)?,
        };

        self.store.put(&patient)?;
        info!(patient_id = %id, empty = update.is_empty(), "patient updated");
        Ok(patient)
    }

    /// Remove a patient.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let _guard = self.write_guard();

        if !self.store.delete(id)? {
            return Err(ServiceError::patient_not_found());
        }
        info!(patient_id = %id, "patient deleted");
        Ok(())
    }
}
