use clinic_core::ServiceError;
use clinic_sql::SQLStore;

/// SQL DDL statements to initialize the lab database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS lab_items (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        category TEXT,
        status TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS lab_tests (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        patient_id TEXT,
        requested_by TEXT,
        test_type TEXT,
        status TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_lab_item_status ON lab_items(status)",
    "CREATE INDEX IF NOT EXISTS idx_lab_item_category ON lab_items(category)",
    "CREATE INDEX IF NOT EXISTS idx_lab_test_status ON lab_tests(status)",
    "CREATE INDEX IF NOT EXISTS idx_lab_test_patient ON lab_tests(patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_lab_test_requester ON lab_tests(requested_by)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("lab schema init failed: {}", e)))?;
    }
    Ok(())
}
