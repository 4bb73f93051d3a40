use clinic_core::ServiceError;
use clinic_sql::SQLStore;

/// SQL DDL statements to initialize the staff database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering and uniqueness.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        email TEXT UNIQUE,
        specialization TEXT,
        department TEXT,
        active INTEGER,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS leave_requests (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        doctor_id TEXT,
        status TEXT,
        from_date TEXT,
        to_date TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_doc_department ON doctors(department)",
    "CREATE INDEX IF NOT EXISTS idx_doc_specialization ON doctors(specialization)",
    "CREATE INDEX IF NOT EXISTS idx_leave_doctor ON leave_requests(doctor_id)",
    "CREATE INDEX IF NOT EXISTS idx_leave_status ON leave_requests(status)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("staff schema init failed: {}", e)))?;
    }
    Ok(())
}
