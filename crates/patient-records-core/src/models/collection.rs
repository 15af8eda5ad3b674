//! The patient collection: the unit of persistence.
//!
//! # Document format
//!
//! The current document is a JSON object keyed by patient ID. Values hold the
//! stored fields plus the derived `bmi` and the category label under both
//! `category` and `verify`. Derived keys are written for readers of the raw
//! file and recomputed on load:
//!
//! ```json
//! {
//!     "P001": { "name": "Ananya", "city": "Guwahati", "age": 28, "gender": "female",
//!               "height": 1.65, "weight": 90.0, "bmi": 33.06,
//!               "category": "Obesity", "verify": "Obesity" }
//! }
//! ```
//!
//! Legacy documents are a JSON array of records carrying a `patient_id` field.
//! They are migrated to the keyed shape when loaded and written back in the
//! current format on the next save.

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Patient, PatientFields};

/// Ordered set of patients, unique by ID.
///
/// Insertion order is preserved: new IDs are appended, replacing an existing
/// ID keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<Patient>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.records.iter().find(|p| p.id == id)
    }

    /// Insert or replace a patient. Returns the replaced record, if any.
    pub fn put(&mut self, patient: Patient) -> Option<Patient> {
        match self.position(&patient.id) {
            Some(idx) => Some(std::mem::replace(&mut self.records[idx], patient)),
            None => {
                self.records.push(patient);
                None
            }
        }
    }

    /// Remove a patient by ID, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Patient> {
        self.position(id).map(|idx| self.records.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<Patient> {
        self.records
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|p| p.id == id)
    }
}

impl FromIterator<Patient> for Collection {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for patient in iter {
            collection.put(patient);
        }
        collection
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for patient in &self.records {
            map.serialize_entry(&patient.id, &patient.fields)?;
        }
        map.end()
    }
}

/// Record shape of the legacy list document.
#[derive(Deserialize)]
struct LegacyRecord {
    patient_id: String,
    #[serde(flatten)]
    fields: PatientFields,
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = Collection;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by patient ID or a list of patient records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut collection = Collection::new();
        while let Some((id, fields)) = access.next_entry::<String, PatientFields>()? {
            collection.put(Patient { id, fields });
        }
        Ok(collection)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut collection = Collection::new();
        while let Some(record) = access.next_element::<LegacyRecord>()? {
            collection.put(Patient {
                id: record.patient_id,
                fields: record.fields,
            });
        }
        Ok(collection)
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CollectionVisitor)
    }
}
