//! Storage layer for patient records.
//!
//! Every backend stores the whole [`Collection`]; [`PatientStore::load`] and
//! [`PatientStore::save`] are the only required operations. The single-record
//! operations have default implementations that load, modify, and save the
//! full collection, which is what the JSON document backend needs. Backends
//! with row-level access override them.

mod json_file;
mod schema;
mod sqlite;

pub use json_file::*;
pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

use crate::models::{Collection, Patient};

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Injected storage capability for the patient collection.
pub trait PatientStore: Send + Sync {
    /// Read the entire collection.
    fn load(&self) -> StoreResult<Collection>;

    /// Replace the entire collection.
    fn save(&self, collection: &Collection) -> StoreResult<()>;

    /// Get a patient by ID.
    fn get(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.load()?.get(id).cloned())
    }

    /// Insert or replace a patient.
    fn put(&self, patient: &Patient) -> StoreResult<()> {
        let mut collection = self.load()?;
        collection.put(patient.clone());
        self.save(&collection)
    }

    /// Delete a patient. Returns whether it existed.
    fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut collection = self.load()?;
        if collection.remove(id).is_none() {
            return Ok(false);
        }
        self.save(&collection)?;
        Ok(true)
    }
}
