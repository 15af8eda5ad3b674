//! Service configuration from command-line flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use patient_records_core::store::{JsonFileStore, PatientStore, SqliteStore, StoreResult};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Single JSON document
    Json,
    /// SQLite database
    Sqlite,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "patient-records-server")]
#[command(about = "HTTP service for managing patient records")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PATIENTS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Storage backend
    #[arg(long, env = "PATIENTS_BACKEND", value_enum, default_value_t = Backend::Json)]
    pub backend: Backend,

    /// Backing JSON document (json backend)
    #[arg(long, env = "PATIENTS_DATA_FILE", default_value = "patients.json")]
    pub data_file: PathBuf,

    /// Database file (sqlite backend)
    #[arg(long, env = "PATIENTS_SQLITE_PATH", default_value = "patients.db")]
    pub sqlite_path: PathBuf,

    /// Write an empty document when the data file does not exist
    #[arg(long, env = "PATIENTS_CREATE_IF_MISSING")]
    pub create_if_missing: bool,
}

impl Config {
    /// Open the configured backend.
    pub fn open_store(&self) -> StoreResult<Arc<dyn PatientStore>> {
        match self.backend {
            Backend::Json if self.create_if_missing => {
                Ok(Arc::new(JsonFileStore::open_or_create(&self.data_file)?))
            }
            Backend::Json => Ok(Arc::new(JsonFileStore::new(&self.data_file))),
            Backend::Sqlite => Ok(Arc::new(SqliteStore::open(&self.sqlite_path)?)),
        }
    }
}
