//! Patient Records Core Library
//!
//! Patient record model, field validation, BMI derivation, and the storage
//! seam used by the HTTP service.
//!
//! # Architecture
//!
//! ```text
//!   HTTP handler ──► PatientService ──► dyn PatientStore
//!                      │  (single-writer lock)   │
//!                      │                         ├── JsonFileStore (one JSON document)
//!                      ▼                         └── SqliteStore   (one row per patient)
//!                 validate + derive
//!                 (bmi, category)
//! ```
//!
//! # Core Principle
//!
//! **The store is the only source of truth.** Nothing is cached between
//! calls; derived values are recomputed from stored fields on every read.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, PatientFields, PatientUpdate, Collection)
//! - [`store`]: Storage trait and backends
//! - [`service`]: Request-level operations (view, search, sort, create, update, delete)

pub mod models;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use models::{
    Collection, Gender, NewPatient, Patient, PatientFields, PatientUpdate, ValidationError,
    WeightCategory,
};
pub use service::{PatientService, ServiceError, ServiceResult, SortField, SortOrder};
pub use store::{JsonFileStore, PatientStore, SqliteStore, StoreError, StoreResult};
