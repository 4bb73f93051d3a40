//! Login accounts — username, argon2id password hash, role.
//!
//! Accounts exist so role-gated bearer tokens can be minted; they are not a
//! user-management surface. The admin creates accounts for staff; a doctor
//! or patient account carries the id of its staff/patient record so
//! visibility filters can match on it.

use std::sync::Arc;

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};

use clinic_core::{ListResult, Role, ServiceError, new_id, now_rfc3339};
use clinic_sql::{SQLStore, Value};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    username    TEXT UNIQUE NOT NULL,
    role        TEXT NOT NULL,
    create_at   TEXT NOT NULL
)";

/// A login account. The password hash is persisted but never serialized
/// into API responses (see [`Account::sanitized`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    /// Linked record id (doctor id for doctors, patient id for patients).
    /// Tokens carry this as their subject when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub create_at: String,
}

impl Account {
    /// The id embedded in tokens: the linked record when present, the
    /// account itself otherwise.
    pub fn subject(&self) -> &str {
        self.subject_id.as_deref().unwrap_or(&self.id)
    }

    /// API-safe view without the password hash.
    pub fn sanitized(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "username": self.username,
            "role": self.role,
            "name": self.name,
            "subjectId": self.subject_id,
            "createAt": self.create_at,
        })
    }
}

/// Input for creating an account.
#[derive(Debug)]
pub struct CreateAccountInput {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub subject_id: Option<String>,
}

/// Account storage over the shared SQL store.
pub struct AccountStore {
    sql: Arc<dyn SQLStore>,
}

impl AccountStore {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        sql.exec(SCHEMA, &[])
            .map_err(|e| ServiceError::Storage(format!("accounts schema init failed: {}", e)))?;
        Ok(Self { sql })
    }

    /// Create an account, hashing the password with argon2id.
    pub fn create(&self, input: CreateAccountInput) -> Result<Account, ServiceError> {
        if input.username.trim().is_empty() {
            return Err(ServiceError::Validation("username is required".into()));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let account = Account {
            id: new_id(),
            username: input.username,
            password_hash: hash_password(&input.password)?,
            role: input.role,
            name: input.name,
            subject_id: input.subject_id,
            create_at: now_rfc3339(),
        };

        let data = serde_json::to_string(&account)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO accounts (id, data, username, role, create_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(account.id.clone()),
                    Value::Text(data),
                    Value::Text(account.username.clone()),
                    Value::Text(account.role.as_str().to_string()),
                    Value::Text(account.create_at.clone()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(format!("username {} is taken", account.username))
                } else {
                    ServiceError::Storage(msg)
                }
            })?;

        Ok(account)
    }

    /// Insert a fully-built account (bootstrap path — the password is
    /// already hashed in the config).
    pub fn insert_raw(&self, account: &Account) -> Result<(), ServiceError> {
        let data = serde_json::to_string(account)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO accounts (id, data, username, role, create_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(account.id.clone()),
                    Value::Text(data),
                    Value::Text(account.username.clone()),
                    Value::Text(account.role.as_str().to_string()),
                    Value::Text(account.create_at.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Look up an account by username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<Account>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM accounts WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match rows.first() {
            Some(row) => {
                let data = row.get_str("data")
                    .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
                let account = serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// List all accounts, newest first.
    pub fn list(&self, limit: usize, offset: usize) -> Result<ListResult<Account>, ServiceError> {
        let count_rows = self.sql
            .query("SELECT COUNT(*) as cnt FROM accounts", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self.sql
            .query(
                "SELECT data FROM accounts ORDER BY create_at DESC LIMIT ?1 OFFSET ?2",
                &[Value::Integer(limit as i64), Value::Integer(offset as i64)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?,
            );
        }

        Ok(ListResult { items, total })
    }

    /// Delete an account by id.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self.sql
            .exec(
                "DELETE FROM accounts WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("account {}", id)));
        }
        Ok(())
    }
}

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password attempt against a stored argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> AccountStore {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        AccountStore::new(sql).unwrap()
    }

    fn sample(username: &str, role: Role) -> CreateAccountInput {
        CreateAccountInput {
            username: username.into(),
            password: "correct horse".into(),
            role,
            name: "Test User".into(),
            subject_id: None,
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("s3cret-pw").unwrap();
        assert!(verify_password("s3cret-pw", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret-pw", "not-a-hash"));
    }

    #[test]
    fn create_and_find() {
        let store = test_store();
        let account = store.create(sample("asha", Role::Doctor)).unwrap();
        assert_eq!(account.role, Role::Doctor);

        let found = store.find_by_username("asha").unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert!(verify_password("correct horse", &found.password_hash));

        assert!(store.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let store = test_store();
        store.create(sample("asha", Role::Doctor)).unwrap();
        let err = store.create(sample("asha", Role::Staff)).unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[test]
    fn short_password_rejected() {
        let store = test_store();
        let mut input = sample("asha", Role::Doctor);
        input.password = "short".into();
        let err = store.create(input).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn subject_falls_back_to_account_id() {
        let store = test_store();
        let plain = store.create(sample("plain", Role::Staff)).unwrap();
        assert_eq!(plain.subject(), plain.id);

        let mut linked = sample("linked", Role::Patient);
        linked.subject_id = Some("pat-42".into());
        let linked = store.create(linked).unwrap();
        assert_eq!(linked.subject(), "pat-42");
    }

    #[test]
    fn sanitized_hides_hash() {
        let store = test_store();
        let account = store.create(sample("asha", Role::Doctor)).unwrap();
        let view = account.sanitized();
        assert!(view.get("passwordHash").is_none());
        assert_eq!(view["username"], "asha");
    }
}
