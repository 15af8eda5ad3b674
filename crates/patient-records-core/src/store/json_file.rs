//! JSON document backend.
//!
//! The whole collection lives in one JSON file. Every operation reads the file
//! and every mutation rewrites it. Writes go to a temporary sibling file that
//! is renamed over the document, so a reader sees either the old or the new
//! document, never a partial one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;
use uuid::Uuid;

use super::{PatientStore, StoreError, StoreResult};
use crate::models::Collection;

/// Patient store backed by a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use the document at `path`. Nothing is read until the first operation.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Use the document at `path`, writing an empty collection if it does not exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let store = Self::new(path);
        if !store.path.exists() {
            debug!(path = %store.path.display(), "creating empty patient document");
            store.save(&Collection::new())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "patients.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

/// Serialize with four-space indentation.
fn to_document(collection: &Collection) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    collection.serialize(&mut ser)?;
    Ok(buf)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl PatientStore for JsonFileStore {
    fn load(&self) -> StoreResult<Collection> {
        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let collection: Collection = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), records = collection.len(), "loaded patient document");
        Ok(collection)
    }

    fn save(&self, collection: &Collection) -> StoreResult<()> {
        let bytes = to_document(collection)?;
        let tmp = self.temp_path();

        if let Err(e) = write_synced(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(e));
        }

        debug!(path = %self.path.display(), records = collection.len(), "saved patient document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Patient, PatientFields};

    fn patient(id: &str, weight: f64) -> Patient {
        Patient {
            id: id.into(),
            fields: PatientFields {
                name: "Neha".into(),
                city: "Kolkata".into(),
                age: 24,
                gender: Gender::Female,
                height: 1.7,
                weight,
            },
        }
    }

    #[test]
    fn test_load_missing_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("patients.json"));
        assert!(matches!(store.load(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_load_malformed_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_open_or_create_writes_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        let store = JsonFileStore::open_or_create(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_open_or_create_keeps_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        let store = JsonFileStore::new(&path);
        store.save(&vec![patient("P001", 60.0)].into_iter().collect()).unwrap();

        let reopened = JsonFileStore::open_or_create(&path).unwrap();
        assert_eq!(reopened.load().unwrap().len(), 1);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("patients.json"));
        let collection: Collection = vec![patient("P002", 60.0), patient("P001", 65.0)]
            .into_iter()
            .collect();

        store.save(&collection).unwrap();
        assert_eq!(store.load().unwrap(), collection);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("patients.json"));
        store.save(&vec![patient("P001", 60.0)].into_iter().collect()).unwrap();
        store.save(&Collection::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["patients.json".to_string()]);
    }

    #[test]
    fn test_document_is_indented_and_keyed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        let store = JsonFileStore::new(&path);
        store.save(&vec![patient("P001", 60.0)].into_iter().collect()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"P001\": {\n        \"name\""));
        assert!(text.contains("\"bmi\""));
        assert!(text.contains("\"category\""));
        assert!(text.contains("\"verify\""));
    }

    #[test]
    fn test_legacy_document_is_migrated_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        fs::write(
            &path,
            r#"[{"patient_id":"P001","name":"Neha","city":"Kolkata","age":24,"gender":"female","height":1.7,"weight":60}]"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        store.put(&patient("P002", 70.0)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.is_object());
        assert_eq!(value["P001"]["weight"], 60.0);
        assert_eq!(value["P002"]["weight"], 70.0);
    }

    #[test]
    fn test_default_record_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open_or_create(dir.path().join("patients.json")).unwrap();

        store.put(&patient("P001", 60.0)).unwrap();
        assert_eq!(store.get("P001").unwrap(), Some(patient("P001", 60.0)));

        store.put(&patient("P001", 62.0)).unwrap();
        assert_eq!(store.get("P001").unwrap().unwrap().fields.weight, 62.0);
        assert_eq!(store.load().unwrap().len(), 1);

        assert!(store.delete("P001").unwrap());
        assert!(!store.delete("P001").unwrap());
        assert_eq!(store.get("P001").unwrap(), None);
    }
}
