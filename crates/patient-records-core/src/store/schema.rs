//! SQLite schema definition.

/// Database schema for the SQLite backend.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY NOT NULL,
    position INTEGER NOT NULL,                    -- insertion order
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0 AND age < 120),
    gender TEXT NOT NULL CHECK (gender IN ('male', 'female', 'other')),
    height REAL NOT NULL CHECK (height > 0),
    weight REAL NOT NULL CHECK (weight > 0)
);

CREATE INDEX IF NOT EXISTS idx_patients_position ON patients(position);
"#;
