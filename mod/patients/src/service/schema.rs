use clinic_core::ServiceError;
use clinic_sql::SQLStore;

/// SQL DDL statements to initialize the patients database schema.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        blood_group TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        patient_id TEXT,
        doctor_id TEXT,
        date TEXT,
        status TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS prescriptions (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        patient_id TEXT,
        doctor_id TEXT,
        create_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_appt_patient ON appointments(patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_appt_doctor ON appointments(doctor_id)",
    "CREATE INDEX IF NOT EXISTS idx_appt_status ON appointments(status)",
    "CREATE INDEX IF NOT EXISTS idx_appt_date ON appointments(date)",
    "CREATE INDEX IF NOT EXISTS idx_rx_patient ON prescriptions(patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_rx_doctor ON prescriptions(doctor_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("patients schema init failed: {}", e)))?;
    }
    Ok(())
}
