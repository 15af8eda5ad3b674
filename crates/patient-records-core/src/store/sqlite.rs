//! SQLite backend.
//!
//! One row per patient, with a `position` column carrying insertion order.
//! `save` replaces all rows in a single transaction; the record operations
//! touch one row each.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex is reported as
//! [`StoreError::LockPoisoned`].

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{PatientStore, StoreError, StoreResult, SCHEMA};
use crate::models::{Collection, Gender, Patient, PatientFields};

const SELECT_COLUMNS: &str = "SELECT id, name, city, age, gender, height, weight FROM patients";

/// Patient store backed by a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Raw row, converted to a `Patient` once the gender is parsed.
struct PatientRow {
    id: String,
    name: String,
    city: String,
    age: i64,
    gender: String,
    height: f64,
    weight: f64,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            age: row.get(3)?,
            gender: row.get(4)?,
            height: row.get(5)?,
            weight: row.get(6)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = StoreError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let gender: Gender = row.gender.parse().map_err(|e| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("{}", e),
        })?;
        Ok(Patient {
            id: row.id,
            fields: PatientFields {
                name: row.name,
                city: row.city,
                age: row.age,
                gender,
                height: row.height,
                weight: row.weight,
            },
        })
    }
}

impl PatientStore for SqliteStore {
    fn load(&self) -> StoreResult<Collection> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY position", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], PatientRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let collection = rows
            .into_iter()
            .map(Patient::try_from)
            .collect::<Result<Collection, _>>()?;
        debug!(records = collection.len(), "loaded patients from sqlite");
        Ok(collection)
    }

    fn save(&self, collection: &Collection) -> StoreResult<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM patients", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO patients (id, position, name, city, age, gender, height, weight)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for (position, patient) in collection.iter().enumerate() {
                let f = &patient.fields;
                stmt.execute(params![
                    patient.id,
                    position as i64,
                    f.name,
                    f.city,
                    f.age,
                    f.gender.as_str(),
                    f.height,
                    f.weight,
                ])?;
            }
        }
        tx.commit()?;
        debug!(records = collection.len(), "saved patients to sqlite");
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Patient>> {
        let conn = self.conn.lock()?;
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?;
        row.map(Patient::try_from).transpose()
    }

    fn put(&self, patient: &Patient) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        let f = &patient.fields;
        conn.execute(
            r#"
            INSERT INTO patients (id, position, name, city, age, gender, height, weight)
            VALUES (?1, (SELECT IFNULL(MAX(position), -1) + 1 FROM patients), ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                city = excluded.city,
                age = excluded.age,
                gender = excluded.gender,
                height = excluded.height,
                weight = excluded.weight
            "#,
            params![
                patient.id,
                f.name,
                f.city,
                f.age,
                f.gender.as_str(),
                f.height,
                f.weight,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock()?;
        let rows_affected = conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
